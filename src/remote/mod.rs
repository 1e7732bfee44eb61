//! HTTP transport to the evidence catalog backend.
//!
//! The list manager and the deletion coordinator never talk to reqwest
//! directly. They go through the [`CatalogApi`] trait so tests can inject an
//! in-memory backend and the binary can inject [`ApiClient`].

pub mod client;
pub mod dto;
pub mod error;
pub mod fetch;

use std::fmt;

use serde_json::Value;

use crate::error::Result;

pub use client::{ApiClient, Credentials};
pub use error::{ApiError, GENERIC_MUTATION_FAILURE};
pub use fetch::{decode_collection, decode_entity, fetch_collection, fetch_one};

/// A path on the catalog backend plus optional query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Async access to the catalog REST API.
///
/// Implementations return the decoded JSON body on 2xx and an error
/// otherwise. Authentication recovery (refresh then retry once) is the
/// implementation's concern; callers only ever see the final outcome.
pub trait CatalogApi: Send + Sync {
    /// `GET` a JSON document
    fn get(&self, endpoint: &Endpoint) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// `POST` a JSON body and return the saved entity
    fn post(
        &self,
        endpoint: &Endpoint,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// `PUT` a JSON body and return the saved entity
    fn put(
        &self,
        endpoint: &Endpoint,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// `DELETE` a resource; the response body is ignored
    fn delete(&self, endpoint: &Endpoint) -> impl std::future::Future<Output = Result<()>> + Send;
}
