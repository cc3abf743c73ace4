//! In-process [`DocumentStore`] used for development and tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{DocumentStore, Query, StoreError};

type Collection = BTreeMap<String, Map<String, Value>>;

/// Documents kept in memory, listed in id order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn into_object(document: Value, what: &str) -> Result<Map<String, Value>, StoreError> {
    match document {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Validation(format!(
            "{what} must be a JSON object, got {other}"
        ))),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let mut document = into_object(document, "document")?;
        let id = match document.get("id") {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(StoreError::Validation(format!("invalid document id: {other}")));
            }
        };
        document.insert("id".into(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::Validation(format!(
                "{collection}/{id} already exists"
            )));
        }
        docs.insert(id, document.clone());
        Ok(Value::Object(document))
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .map(Value::Object))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().map(Value::Object).collect())
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Value, StoreError> {
        let fields = into_object(fields, "update")?;
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in fields {
            // the id is the document key and cannot be rewritten
            if key != "id" {
                document.insert(key, value);
            }
        }
        Ok(Value::Object(document.clone()))
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Value, StoreError> {
        let mut document = into_object(document, "document")?;
        document.insert("id".into(), Value::String(id.to_string()));
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        *stored = document.clone();
        Ok(Value::Object(document))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let documents = self.list(collection).await?;
        Ok(query.apply(documents))
    }
}
