//! `DocumentStore` trait and the client the schedule pages use to reach it.
//!
//! Nothing here is a global: build a [`StoreConfig`](config::StoreConfig), pick a
//! backend, and hand the resulting [`StoreClient`](client::StoreClient) to
//! whatever needs it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod catalog;
pub mod client;
pub mod config;
pub mod memory;
pub mod observability;
pub mod query;
pub mod records;
pub mod retry;

pub use catalog::{SongCatalog, load_song_file};
pub use client::StoreClient;
pub use config::StoreConfig;
pub use memory::InMemoryStore;
pub use query::{Direction, Filter, FilterOp, OrderBy, Query};
pub use records::Collection;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Only transient failures and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_) | StoreError::Timeout(_))
    }
}

/// Document-store operations over JSON documents grouped in named collections.
///
/// A missing document is not an error for reads: `read` returns `Ok(None)` and
/// `query` returns an empty list.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Store a new document. An `id` is assigned when the document has none;
    /// the stored document, including its `id`, is returned.
    async fn create(&self, collection: &str, document: Value) -> Result<Value, StoreError>;

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Shallow-merge `fields` into an existing document and return the result.
    async fn update(&self, collection: &str, id: &str, fields: Value)
    -> Result<Value, StoreError>;

    /// Overwrite an existing document with `document`; fields it lacks are gone
    /// afterwards. The stored `id` is kept.
    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Value, StoreError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError>;
}
