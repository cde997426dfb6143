//! One handler per operation.
//!
//! Every handler takes the store explicitly and answers with the string that is
//! returned to the caller. Validation misses and store failures are ordinary
//! return values, never errors.

use std::fmt::Display;

use tracing::{error, info, warn};

use crate::errors;
use crate::operation::Operation;
use crate::request::Request;
use crate::store::{NAME_ATTRIBUTE, Record, RecordStore};

pub const MISSING_ID_OR_NAME: &str = "Missing parameters: id or name";
pub const MISSING_ID: &str = "Missing parameter: id";
pub const ITEM_INSERTED: &str = "Item inserted successfully";
pub const ITEM_NOT_FOUND: &str = "Item not found";
pub const ITEM_UPDATED: &str = "Item updated successfully";
pub const ITEM_DELETED: &str = "Item deleted successfully";

/// Writes `{id, name}`, replacing any record with the same id.
pub async fn create<S: RecordStore + ?Sized>(store: &S, request: &Request) -> String {
    let (Some(id), Some(name)) = (request.id.as_deref(), request.name.as_deref()) else {
        warn!(id = ?request.id, name = ?request.name, "{}", MISSING_ID_OR_NAME);
        return MISSING_ID_OR_NAME.to_string();
    };

    info!(id, name, "Creating item");
    let record = Record::new(id, name);
    match store.put(&record).await {
        Ok(()) => {
            info!(item = %serde_json::Value::Object(record.to_item()), "Item inserted");
            ITEM_INSERTED.to_string()
        }
        Err(e) => failure(&Operation::Create, e),
    }
}

/// Returns the stored record as a JSON document.
pub async fn read<S: RecordStore + ?Sized>(store: &S, request: &Request) -> String {
    let Some(id) = request.id.as_deref() else {
        warn!("{}", MISSING_ID);
        return MISSING_ID.to_string();
    };

    info!(id, "Getting item");
    match fetch_rendered(store, id).await {
        Ok(Some(document)) => {
            info!(item = %document, "Item retrieved");
            document
        }
        Ok(None) => {
            info!(id, "Item not found");
            ITEM_NOT_FOUND.to_string()
        }
        Err(e) => failure(&Operation::Read, e),
    }
}

async fn fetch_rendered<S: RecordStore + ?Sized>(
    store: &S,
    id: &str,
) -> errors::Result<Option<String>> {
    let Some(item) = store.get(id).await? else {
        return Ok(None);
    };
    Ok(Some(serde_json::to_string(&item)?))
}

/// Sets `name` on the record, creating it if needed. Other attributes are left alone.
pub async fn update<S: RecordStore + ?Sized>(store: &S, request: &Request) -> String {
    let (Some(id), Some(name)) = (request.id.as_deref(), request.name.as_deref()) else {
        warn!(id = ?request.id, name = ?request.name, "{}", MISSING_ID_OR_NAME);
        return MISSING_ID_OR_NAME.to_string();
    };

    info!(id, name, "Updating item");
    match store.update_attribute(id, NAME_ATTRIBUTE, name).await {
        Ok(item) => {
            info!(item = %serde_json::Value::Object(item), "Item updated");
            ITEM_UPDATED.to_string()
        }
        Err(e) => failure(&Operation::Update, e),
    }
}

/// Removes the record. Succeeds whether or not it existed.
pub async fn delete<S: RecordStore + ?Sized>(store: &S, request: &Request) -> String {
    let Some(id) = request.id.as_deref() else {
        warn!("{}", MISSING_ID);
        return MISSING_ID.to_string();
    };

    info!(id, "Deleting item");
    match store.delete(id).await {
        Ok(()) => {
            info!(id, "Item deleted");
            ITEM_DELETED.to_string()
        }
        Err(e) => failure(&Operation::Delete, e),
    }
}

fn failure(operation: &Operation, err: impl Display) -> String {
    let message = format!("Error during {}: {}", operation, err);
    error!("{}", message);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn request(operation: Operation, id: Option<&str>, name: Option<&str>) -> Request {
        Request {
            operation,
            id: id.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_requires_id_and_name() {
        let store = InMemoryStore::new();

        let response = create(&store, &request(Operation::Create, Some("1"), None)).await;
        assert_eq!(response, MISSING_ID_OR_NAME);

        let response = create(&store, &request(Operation::Create, None, Some("Ada"))).await;
        assert_eq!(response, MISSING_ID_OR_NAME);

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let store = InMemoryStore::new();

        let response = create(&store, &request(Operation::Create, Some("1"), Some("Ada"))).await;
        assert_eq!(response, ITEM_INSERTED);

        let response = read(&store, &request(Operation::Read, Some("1"), None)).await;
        let document: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(document, serde_json::json!({"id": "1", "name": "Ada"}));
    }

    #[tokio::test]
    async fn test_read_ignores_name() {
        let store = InMemoryStore::new();
        let response = read(&store, &request(Operation::Read, Some("1"), Some("Ada"))).await;
        assert_eq!(response, ITEM_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_and_delete_require_id() {
        let store = InMemoryStore::new();
        assert_eq!(read(&store, &request(Operation::Read, None, None)).await, MISSING_ID);
        assert_eq!(
            delete(&store, &request(Operation::Delete, None, Some("Ada"))).await,
            MISSING_ID
        );
    }

    #[tokio::test]
    async fn test_update_requires_id_and_name() {
        let store = InMemoryStore::new();
        let response = update(&store, &request(Operation::Update, Some("1"), None)).await;
        assert_eq!(response, MISSING_ID_OR_NAME);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_upserts() {
        let store = InMemoryStore::new();
        let response = update(&store, &request(Operation::Update, Some("9"), Some("Linus"))).await;
        assert_eq!(response, ITEM_UPDATED);

        let item = store.get("9").await.unwrap().unwrap();
        assert_eq!(item["name"], "Linus");
    }

    #[tokio::test]
    async fn test_delete_missing_record_succeeds() {
        let store = InMemoryStore::new();
        let response = delete(&store, &request(Operation::Delete, Some("nope"), None)).await;
        assert_eq!(response, ITEM_DELETED);
    }

    #[test]
    fn test_failure_message() {
        let message = failure(&Operation::Update, "ValidationException: bad expression");
        assert_eq!(
            message,
            "Error during update: ValidationException: bad expression"
        );
    }
}
