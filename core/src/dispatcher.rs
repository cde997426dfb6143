use serde_json::Value;
use tracing::{error, info, warn};

use crate::handlers;
use crate::operation::Operation;
use crate::request::Request;
use crate::store::RecordStore;

pub const PARSE_ERROR_PREFIX: &str = "Error parsing event: ";
pub const UNKNOWN_OPERATION_PREFIX: &str = "Unknown operation: ";

/// Handles one invocation: extracts the request from the raw event, routes
/// it to exactly one handler and returns that handler's response.
///
/// A malformed event is answered with `Error parsing event: ...` before the
/// store is touched.
pub async fn dispatch<S: RecordStore + ?Sized>(store: &S, event: &Value) -> String {
    info!(%event, "Received event");

    let request = match Request::from_event(event) {
        Ok(request) => request,
        Err(e) => {
            let message = format!("{}{}", PARSE_ERROR_PREFIX, e);
            error!("{}", message);
            return message;
        }
    };

    route(store, &request).await
}

pub async fn route<S: RecordStore + ?Sized>(store: &S, request: &Request) -> String {
    match &request.operation {
        Operation::Create => handlers::create(store, request).await,
        Operation::Read => handlers::read(store, request).await,
        Operation::Update => handlers::update(store, request).await,
        Operation::Delete => handlers::delete(store, request).await,
        unknown @ Operation::Unknown(_) => {
            let message = format!("{}{}", UNKNOWN_OPERATION_PREFIX, unknown);
            warn!("{}", message);
            message
        }
    }
}
