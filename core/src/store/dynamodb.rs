//! DynamoDB record store.
//!
//! One fixed table with a string partition key named `id`. SDK errors are
//! mapped onto `StoreError` per operation.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use tracing::debug;

use super::conversions::{item_to_json, record_to_item};
use super::{ID_ATTRIBUTE, Item, Record, RecordStore};
use crate::config::DispatchConfig;
use crate::errors::StoreError;

pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds a store with a fresh client over an already loaded SDK config.
    pub fn from_sdk_config(sdk_config: &SdkConfig, table_name: impl Into<String>) -> Self {
        Self::new(Client::new(sdk_config), table_name)
    }

    pub async fn from_config(config: &DispatchConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;
        Self::from_sdk_config(&sdk_config, config.table_name.clone())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }
}

/// Resolves region, credentials and endpoint from the config, falling back to
/// the default AWS provider chain for anything left unset.
pub async fn load_sdk_config(config: &DispatchConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }

    if let (Some(access_key), Some(secret_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        loader = loader.credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
            access_key,
            secret_key,
            config.session_token.clone(),
            None,
            "crud-dispatch",
        ));
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    async fn put(&self, record: &Record) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &self.table_name))?;

        debug!(table = %self.table_name, id = %record.id, "PutItem succeeded");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, Self::key(id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| map_get_item_error(e, &self.table_name))?;

        match result.item {
            Some(item) => Ok(Some(item_to_json(&item)?)),
            None => Ok(None),
        }
    }

    async fn update_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Item, StoreError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, Self::key(id))
            .update_expression("SET #attr = :value")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", AttributeValue::S(value.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| map_update_item_error(e, &self.table_name))?;

        item_to_json(&result.attributes.unwrap_or_default())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, Self::key(id))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, &self.table_name))?;

        Ok(())
    }
}

/// Failures raised before or outside a modeled service response.
///
/// Only timeouts and I/O dispatch failures count as connection problems; a
/// request that could not be built or routed (no region, bad endpoint) is a
/// client configuration problem.
fn sdk_failure<E, R>(operation: &'static str, err: &SdkError<E, R>) -> Option<StoreError>
where
    E: std::error::Error + 'static,
    R: Debug,
{
    let context = || DisplayErrorContext(err).to_string();
    match err {
        SdkError::TimeoutError(_) => Some(StoreError::ConnectionFailed(context())),
        SdkError::DispatchFailure(failure) if failure.is_io() || failure.is_timeout() => {
            Some(StoreError::ConnectionFailed(context()))
        }
        SdkError::DispatchFailure(_) | SdkError::ConstructionFailure(_) => {
            Some(StoreError::Misconfigured(context()))
        }
        SdkError::ResponseError(_) => Some(StoreError::RequestFailed {
            operation,
            reason: context(),
        }),
        _ => None,
    }
}

fn service_failure<E>(operation: &'static str, err: &E) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let reason = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => DisplayErrorContext(err).to_string(),
    };
    StoreError::RequestFailed { operation, reason }
}

fn table_not_found(table: &str) -> StoreError {
    StoreError::TableNotFound {
        table: table.to_string(),
    }
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table: &str,
) -> StoreError {
    if let Some(failure) = sdk_failure("GetItem", &err) {
        return failure;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => table_not_found(table),
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => StoreError::Throttled,
        err => service_failure("GetItem", &err),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table: &str,
) -> StoreError {
    if let Some(failure) = sdk_failure("PutItem", &err) {
        return failure;
    }
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => table_not_found(table),
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_) => StoreError::Throttled,
        err => service_failure("PutItem", &err),
    }
}

/// Map an UpdateItem SDK error to StoreError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    table: &str,
) -> StoreError {
    if let Some(failure) = sdk_failure("UpdateItem", &err) {
        return failure;
    }
    match err.into_service_error() {
        UpdateItemError::ResourceNotFoundException(_) => table_not_found(table),
        UpdateItemError::ProvisionedThroughputExceededException(_)
        | UpdateItemError::RequestLimitExceeded(_) => StoreError::Throttled,
        err => service_failure("UpdateItem", &err),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table: &str,
) -> StoreError {
    if let Some(failure) = sdk_failure("DeleteItem", &err) {
        return failure;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => table_not_found(table),
        DeleteItemError::ProvisionedThroughputExceededException(_)
        | DeleteItemError::RequestLimitExceeded(_) => StoreError::Throttled,
        err => service_failure("DeleteItem", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::error::ErrorMetadata;
    use aws_smithy_runtime_api::client::result::ConnectorError;
    use aws_sdk_dynamodb::types::error::{
        ProvisionedThroughputExceededException, ResourceNotFoundException,
    };

    fn create_test_store(table_name: &str) -> DynamoDbStore {
        // Never sends a request; only used to exercise construction.
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                "test", "test", None, None, "test",
            ))
            .build();
        DynamoDbStore::new(Client::from_conf(config), table_name)
    }

    #[test]
    fn test_table_name() {
        let store = create_test_store("MyTable");
        assert_eq!(store.table_name(), "MyTable");
    }

    #[test]
    fn test_timeout_maps_to_connection_failed() {
        let err: SdkError<GetItemError, ()> = SdkError::timeout_error("deadline elapsed");
        let mapped = map_get_item_error(err, "MyTable");
        assert!(matches!(mapped, StoreError::ConnectionFailed(_)));
    }

    #[test]
    fn test_construction_failure_keeps_message() {
        let err: SdkError<UpdateItemError, ()> =
            SdkError::construction_failure("failed to construct request: no region configured");
        let mapped = map_update_item_error(err, "MyTable");

        assert!(matches!(mapped, StoreError::Misconfigured(_)));
        assert!(
            mapped.to_string().contains("no region configured"),
            "got: {}",
            mapped
        );
    }

    #[test]
    fn test_non_io_dispatch_failure_is_misconfiguration() {
        let err: SdkError<GetItemError, ()> = SdkError::dispatch_failure(ConnectorError::user(
            "endpoint resolution failed: a region must be set".into(),
        ));
        let mapped = map_get_item_error(err, "MyTable");

        assert!(matches!(mapped, StoreError::Misconfigured(_)));
        assert!(mapped.to_string().contains("a region must be set"));
    }

    #[test]
    fn test_io_dispatch_failure_is_connection_failure() {
        let err: SdkError<DeleteItemError, ()> = SdkError::dispatch_failure(ConnectorError::io(
            "connection refused".into(),
        ));
        let mapped = map_delete_item_error(err, "MyTable");

        assert!(matches!(
            mapped,
            StoreError::ConnectionFailed(ref msg) if msg.contains("connection refused")
        ));
    }

    #[test]
    fn test_response_error_keeps_message() {
        let err: SdkError<PutItemError, ()> =
            SdkError::response_error("failed to parse response body", ());
        let mapped = map_put_item_error(err, "MyTable");

        assert!(matches!(mapped, StoreError::RequestFailed { operation: "PutItem", .. }));
        assert!(mapped.to_string().contains("failed to parse response body"));
    }

    #[test]
    fn test_missing_table() {
        let err: SdkError<PutItemError, ()> = SdkError::service_error(
            PutItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            ),
            (),
        );
        assert_eq!(
            map_put_item_error(err, "MyTable"),
            StoreError::TableNotFound {
                table: "MyTable".to_string()
            }
        );
    }

    #[test]
    fn test_throughput_exceeded_is_throttled() {
        let err: SdkError<DeleteItemError, ()> = SdkError::service_error(
            DeleteItemError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("slow down")
                    .build(),
            ),
            (),
        );
        assert_eq!(map_delete_item_error(err, "MyTable"), StoreError::Throttled);
    }

    #[test]
    fn test_unmodeled_error_keeps_code_and_message() {
        let err: SdkError<UpdateItemError, ()> = SdkError::service_error(
            UpdateItemError::generic(
                ErrorMetadata::builder()
                    .code("ValidationException")
                    .message("Invalid UpdateExpression")
                    .build(),
            ),
            (),
        );
        assert_eq!(
            map_update_item_error(err, "MyTable"),
            StoreError::RequestFailed {
                operation: "UpdateItem",
                reason: "ValidationException: Invalid UpdateExpression".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_load_sdk_config_applies_overrides() {
        let config = DispatchConfig {
            region: Some("eu-central-1".to_string()),
            endpoint_url: Some("http://localhost:8000".to_string()),
            access_key_id: Some("local".to_string()),
            secret_access_key: Some("local".to_string()),
            ..DispatchConfig::default()
        };

        let sdk_config = load_sdk_config(&config).await;
        assert_eq!(
            sdk_config.region().map(|r| r.to_string()),
            Some("eu-central-1".to_string())
        );
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:8000"));
    }

    // Needs DynamoDB Local on port 8000 with a table `MyTable` keyed by string `id`.
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_dynamodb_local() {
        let config = DispatchConfig {
            region: Some("us-east-1".to_string()),
            endpoint_url: Some("http://localhost:8000".to_string()),
            access_key_id: Some("local".to_string()),
            secret_access_key: Some("local".to_string()),
            ..DispatchConfig::default()
        };
        let store = DynamoDbStore::from_config(&config).await;

        store.put(&Record::new("it-1", "Ada")).await.unwrap();
        let item = store.get("it-1").await.unwrap().unwrap();
        assert_eq!(item["name"], "Ada");

        let item = store.update_attribute("it-1", "name", "Grace").await.unwrap();
        assert_eq!(item["name"], "Grace");

        store.delete("it-1").await.unwrap();
        assert!(store.get("it-1").await.unwrap().is_none());
    }
}
