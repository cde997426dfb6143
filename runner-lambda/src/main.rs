use aws_config::SdkConfig;
use dispatch_core::config::{DispatchConfig, load_config};
use dispatch_core::store::DynamoDbStore;
use dispatch_core::store::dynamodb::load_sdk_config;
use dispatch_core::{dispatch, telemetry};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{Instrument, info, info_span};

/// Each invocation builds its own store from the SDK config loaded at cold
/// start and hands it to the dispatcher. Nothing else survives between calls.
pub async fn lambda_handler(
    event: LambdaEvent<Value>,
    sdk_config: &SdkConfig,
    config: &DispatchConfig,
) -> Result<String, Error> {
    let (payload, context) = event.into_parts();
    let span = info_span!("invocation", request_id = %context.request_id);

    async {
        let store = DynamoDbStore::from_sdk_config(sdk_config, config.table_name.clone());
        let response = dispatch(&store, &payload).await;
        info!(table = %config.table_name, "Invocation complete");
        Ok(response)
    }
    .instrument(span)
    .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_tracing();

    let config = load_config(std::env::var("DISPATCH_CONFIG_PATH").ok().as_deref())?;
    let sdk_config = load_sdk_config(&config).await;
    info!(table = %config.table_name, "Starting record dispatcher");

    lambda_runtime::run(service_fn(|event| {
        lambda_handler(event, &sdk_config, &config)
    }))
    .await
}
