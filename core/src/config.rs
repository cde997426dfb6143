use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};

pub const DEFAULT_TABLE_NAME: &str = "MyTable";

/// Environment variable holding a complete YAML configuration document.
pub const CONFIG_ENV_VAR: &str = "DISPATCH_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// The single table every operation is routed to.
    #[serde(default = "default_table_name")]
    pub table_name: String,
    pub region: Option<String>,
    /// Overrides the DynamoDB endpoint, e.g. `http://localhost:8000` for DynamoDB Local.
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            region: None,
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

pub fn load_config(config_path: Option<&str>) -> Result<DispatchConfig> {
    let config = match config_path {
        Some(path) => DispatchConfig::from_file(path)?,
        None => DispatchConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

impl DispatchConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            source: path.to_string(),
            error: Box::new(e),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DispatchConfig = serde_yaml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a variable lookup.
    ///
    /// A full YAML document under [`CONFIG_ENV_VAR`] wins; otherwise the individual
    /// `TABLE_NAME`, `AWS_REGION` and `DYNAMODB_ENDPOINT_URL` variables are read.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(document) = lookup(CONFIG_ENV_VAR) {
            return Self::from_yaml(&document);
        }

        Ok(Self {
            table_name: lookup("TABLE_NAME").unwrap_or_else(default_table_name),
            region: lookup("AWS_REGION"),
            endpoint_url: lookup("DYNAMODB_ENDPOINT_URL"),
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "table_name".to_string(),
            }
            .into());
        }

        if let Some(endpoint) = &self.endpoint_url {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("endpoint_url must be an http(s) URL, got '{}'", endpoint),
                }
                .into());
            }
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ConfigError::ValidationFailed {
                reason: "access_key_id and secret_access_key must be set together".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
