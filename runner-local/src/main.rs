use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dispatch_core::config::load_config;
use dispatch_core::store::DynamoDbStore;
use dispatch_core::store::dynamodb::load_sdk_config;
use dispatch_core::{InMemoryStore, dispatch, telemetry};
use serde_json::Value;
use tracing::info;

/// Runs events through the record dispatcher outside of Lambda.
///
/// The input is one event object, or an array of events handled in order.
/// Each response is printed on its own line.
#[derive(Debug, Parser)]
#[command(name = "dispatch-local", version)]
struct Args {
    /// File holding the event JSON. Reads stdin when omitted.
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Request body to wrap as `{"body": ...}` instead of reading an event.
    #[arg(short, long, conflicts_with = "event")]
    body: Option<String>,

    /// YAML configuration file. Falls back to the environment.
    #[arg(short, long, env = "DISPATCH_CONFIG_PATH")]
    config: Option<String>,

    /// Keep records in memory instead of talking to DynamoDB.
    #[arg(long)]
    in_memory: bool,
}

fn read_events(args: &Args) -> Result<Vec<Value>> {
    if let Some(body) = &args.body {
        return Ok(vec![serde_json::json!({ "body": body })]);
    }

    let text = match &args.event {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read event from stdin")?;
            text
        }
    };

    let input: Value = serde_json::from_str(&text).context("Event input is not valid JSON")?;
    Ok(match input {
        Value::Array(events) => events,
        event => vec![event],
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();
    let events = read_events(&args)?;

    if args.in_memory {
        info!(events = events.len(), "Dispatching against in-memory store");
        let store = InMemoryStore::new();
        for event in &events {
            println!("{}", dispatch(&store, event).await);
        }
        return Ok(());
    }

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let sdk_config = load_sdk_config(&config).await;
    info!(table = %config.table_name, events = events.len(), "Dispatching against DynamoDB");

    for event in &events {
        let store = DynamoDbStore::from_sdk_config(&sdk_config, config.table_name.clone());
        println!("{}", dispatch(&store, event).await);
    }

    Ok(())
}
