//! In-memory record store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ID_ATTRIBUTE, Item, Record, RecordStore};
use crate::errors::StoreError;

/// Record store backed by a `HashMap`, for local runs and tests.
///
/// Clones share the same underlying map. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: Arc<RwLock<HashMap<String, Item>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn put(&self, record: &Record) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        items.insert(record.id.clone(), record.to_item());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let items = self.items.read().await;
        Ok(items.get(id).cloned())
    }

    async fn update_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Item, StoreError> {
        if attribute == ID_ATTRIBUTE {
            return Err(StoreError::RequestFailed {
                operation: "UpdateItem",
                reason: "cannot update attribute part of the key".to_string(),
            });
        }

        let mut items = self.items.write().await;
        let item = items.entry(id.to_string()).or_insert_with(|| {
            let mut item = Item::new();
            item.insert(ID_ATTRIBUTE.to_string(), id.into());
            item
        });
        item.insert(attribute.to_string(), value.into());
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        items.remove(id);
        Ok(())
    }
}
