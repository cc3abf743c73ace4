//! Request metrics for store calls.

use std::time::Duration;

use crate::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    List,
    Update,
    Replace,
    Delete,
    Query,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::Query => "query",
        }
    }
}

pub fn outcome<T>(result: &Result<T, StoreError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(StoreError::Timeout(_)) => "timeout",
        Err(StoreError::NotFound { .. }) => "not_found",
        Err(_) => "error",
    }
}

pub fn record_request<T>(
    collection: &str,
    operation: Operation,
    result: &Result<T, StoreError>,
    elapsed: Duration,
) {
    metrics::counter!(
        "choir_store_requests_total",
        "collection" => collection.to_string(),
        "operation" => operation.as_str(),
        "outcome" => outcome(result),
    )
    .increment(1);
    metrics::histogram!(
        "choir_store_request_duration_seconds",
        "operation" => operation.as_str(),
    )
    .record(elapsed.as_secs_f64());
}
