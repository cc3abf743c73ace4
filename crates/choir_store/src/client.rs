//! [`StoreClient`]: timeouts, retries, logging and metrics around a backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::observability::{self, Operation};
use crate::records::{self, Collection};
use crate::retry::RetryPolicy;
use crate::{DocumentStore, Query, StoreConfig, StoreError};

/// Handle passed to anything that reads or writes schedule data.
///
/// Cloning is cheap; clones share the backend and configuration.
pub struct StoreClient<B> {
    config: Arc<StoreConfig>,
    backend: Arc<B>,
    retry: RetryPolicy,
}

impl<B> Clone for StoreClient<B> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            backend: Arc::clone(&self.backend),
            retry: self.retry.clone(),
        }
    }
}

impl<B: DocumentStore> StoreClient<B> {
    pub fn new(config: StoreConfig, backend: B) -> Self {
        Self::with_shared(config, Arc::new(backend))
    }

    pub fn with_shared(config: StoreConfig, backend: Arc<B>) -> Self {
        let retry = RetryPolicy::with_max_retries(config.max_retries);
        Self {
            config: Arc::new(config),
            backend,
            retry,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn call<T, F, Fut>(
        &self,
        collection: &str,
        operation: Operation,
        mut f: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let timeout = self.config.request_timeout;
        let started = Instant::now();
        let result = self
            .retry
            .retry_async(|| {
                let request = f();
                async move {
                    tokio::time::timeout(timeout, request)
                        .await
                        .unwrap_or(Err(StoreError::Timeout(timeout)))
                }
            })
            .await;
        let elapsed = started.elapsed();
        observability::record_request(collection, operation, &result, elapsed);

        match &result {
            Ok(_) if self.config.debug_mode => debug!(
                collection,
                operation = operation.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                "store request ok"
            ),
            Ok(_) => {}
            Err(e) => warn!(
                collection,
                operation = operation.as_str(),
                error = %e,
                "store request failed"
            ),
        }
        result
    }

    pub async fn create(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        if !document.is_object() {
            return Err(StoreError::Validation(format!(
                "cannot create {collection} document from {document}"
            )));
        }
        self.call(collection, Operation::Create, || {
            self.backend.create(collection, document.clone())
        })
        .await
    }

    pub async fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.call(collection, Operation::Read, || {
            self.backend.read(collection, id)
        })
        .await
    }

    pub async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.call(collection, Operation::List, || self.backend.list(collection))
            .await
    }

    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<Value, StoreError> {
        self.call(collection, Operation::Update, || {
            self.backend.update(collection, id, fields.clone())
        })
        .await
    }

    pub async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Value, StoreError> {
        if !document.is_object() {
            return Err(StoreError::Validation(format!(
                "cannot replace {collection}/{id} with {document}"
            )));
        }
        self.call(collection, Operation::Replace, || {
            self.backend.replace(collection, id, document.clone())
        })
        .await
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.call(collection, Operation::Delete, || {
            self.backend.delete(collection, id)
        })
        .await
    }

    pub async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        if self.config.debug_mode {
            debug!(collection, filters = query.filters.len(), "querying");
        }
        self.call(collection, Operation::Query, || {
            self.backend.query(collection, query)
        })
        .await
    }

    /// Every document of `collection`, decoded as `T`.
    pub async fn fetch_records<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        self.list(collection.name())
            .await?
            .into_iter()
            .map(records::decode)
            .collect()
    }

    pub async fn fetch_record<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        self.read(collection.name(), id)
            .await?
            .map(records::decode)
            .transpose()
    }
}
