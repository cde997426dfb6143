use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {source}: {error}")]
    LoadFailed {
        source: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Reasons an incoming event could not be turned into a request.
///
/// The `Display` text is what callers see after the `Error parsing event: ` prefix.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("body must be a JSON string or object, got {kind}")]
    InvalidBody { kind: &'static str },

    #[error("body must decode to a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("field `{field}` must be a string or an integer that fits in 64 bits")]
    InexactNumber { field: &'static str },

    #[error("field `{field}` cannot be read as text, got {kind}")]
    NotScalar { field: &'static str, kind: &'static str },
}

/// Failures reported by a record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error("Throughput exceeded, please retry")]
    Throttled,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Store client misconfigured: {0}")]
    Misconfigured(String),

    #[error("{operation} failed: {reason}")]
    RequestFailed {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Invalid {
            message: err.to_string(),
        }
    }
}
