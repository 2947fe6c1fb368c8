//! DOI resolution and reference cross-checks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paleosheet::doi::{DoiService, HttpDoiResolver};
//!
//! let resolver = HttpDoiResolver::from_env(config.doi_resolver_url());
//! let mut service = DoiService::new(resolver, config.doi_cache_capacity());
//! let response = service.lookup("10.1029/2019PA003773").await?;
//! ```

pub mod client;
pub mod validator;

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStats, LookupCache};
use crate::error::DoiError;

pub use client::{HttpDoiResolver, BIBLIOGRAPHY_ACCEPT, DOI_RESOLVER_ENV};
pub use validator::{check_doi, check_reference, ExternalReferenceValidator, DOI_PREFIX};

/// Status code and raw body of one resolver request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl DoiResponse {
    /// Only HTTP 200 counts as a resolved DOI.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Something that can look a DOI up.
///
/// A non-200 answer is a normal [`DoiResponse`]; `Err` is reserved for
/// transport failures, which abort the run.
#[allow(async_fn_in_trait)]
pub trait DoiResolver {
    async fn resolve(&self, doi: &str) -> Result<DoiResponse, DoiError>;
}

/// A resolver with an LRU cache in front of it.
pub struct DoiService<R> {
    resolver: R,
    cache: LookupCache<String, Arc<DoiResponse>>,
}

impl<R: DoiResolver> DoiService<R> {
    pub fn new(resolver: R, cache_capacity: usize) -> Self {
        Self {
            resolver,
            cache: LookupCache::new(cache_capacity),
        }
    }

    /// Resolve `doi`, reusing a cached response when there is one.
    pub async fn lookup(&mut self, doi: &str) -> Result<Arc<DoiResponse>, DoiError> {
        let key = doi.to_string();
        if let Some(cached) = self.cache.get(&key) {
            debug!(doi, "DOI cache hit");
            return Ok(Arc::clone(cached));
        }

        debug!(doi, "DOI cache miss");
        let response = Arc::new(self.resolver.resolve(doi).await?);
        self.cache.insert(key, Arc::clone(&response));
        Ok(response)
    }

    /// Number of requests that actually reached the resolver.
    pub fn requests(&self) -> u64 {
        self.cache.stats().misses
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

/// Canned resolver for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::{DoiResolver, DoiResponse};
    use crate::error::DoiError;

    /// Answers from a fixed table (404 for anything else) and records every
    /// DOI it was asked for.
    #[derive(Default)]
    pub struct FakeResolver {
        responses: HashMap<String, DoiResponse>,
        calls: Cell<usize>,
        asked: RefCell<Vec<String>>,
    }

    impl FakeResolver {
        pub fn with(mut self, doi: &str, status: u16, body: &[u8]) -> Self {
            self.responses.insert(
                doi.to_string(),
                DoiResponse {
                    status,
                    body: body.to_vec(),
                },
            );
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        pub fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }
    }

    impl DoiResolver for FakeResolver {
        async fn resolve(&self, doi: &str) -> Result<DoiResponse, DoiError> {
            self.calls.set(self.calls.get() + 1);
            self.asked.borrow_mut().push(doi.to_string());
            Ok(self.responses.get(doi).cloned().unwrap_or(DoiResponse {
                status: 404,
                body: Vec::new(),
            }))
        }
    }
}
