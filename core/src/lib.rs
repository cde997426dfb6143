pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod operation;
pub mod request;
pub mod store;
pub mod telemetry;

pub use config::{DispatchConfig, load_config};
pub use dispatcher::dispatch;
pub use errors::{DispatchError, Result};
pub use operation::Operation;
pub use request::Request;
pub use store::{DynamoDbStore, InMemoryStore, Record, RecordStore};
