pub mod conversions;
pub mod dynamodb;
pub mod memory;

use async_trait::async_trait;

use crate::errors::StoreError;

pub use dynamodb::DynamoDbStore;
pub use memory::InMemoryStore;

/// Partition key attribute of the records table.
pub const ID_ATTRIBUTE: &str = "id";
pub const NAME_ATTRIBUTE: &str = "name";

/// Every attribute of a stored record, as JSON.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// The record written by `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub name: String,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(ID_ATTRIBUTE.to_string(), self.id.clone().into());
        item.insert(NAME_ATTRIBUTE.to_string(), self.name.clone().into());
        item
    }
}

/// Key-value store holding records addressed by `id`.
///
/// Writes are last-write-wins; implementations do no locking beyond what the
/// backing store provides.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes the record, replacing any record with the same id.
    async fn put(&self, record: &Record) -> Result<(), StoreError>;

    /// Fetches all attributes of the record, or `None` if there is no such id.
    async fn get(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// Sets a single string attribute, creating the record if it does not exist.
    /// Returns the record's attributes after the update.
    async fn update_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Item, StoreError>;

    /// Removes the record. Deleting a missing id is not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
