//! HTTP client for the DOI resolution service.

use std::env;

use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use super::{DoiResolver, DoiResponse};
use crate::error::DoiError;

/// Asks the resolver for a formatted reference instead of a redirect.
pub const BIBLIOGRAPHY_ACCEPT: &str = "text/bibliography; style=american-geophysical-union; locale=en-EN";

/// Environment variable overriding the configured resolver URL.
pub const DOI_RESOLVER_ENV: &str = "DOI_RESOLVER_URL";

/// Resolver backed by a `dx.doi.org`-style service.
#[derive(Clone)]
pub struct HttpDoiResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDoiResolver {
    /// Create a resolver for an explicit base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a resolver from `DOI_RESOLVER_URL`, falling back to `configured`
    pub fn from_env(configured: &str) -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        match env::var(DOI_RESOLVER_ENV) {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Self::new(configured),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The request URL for one DOI.
    pub fn url_for(&self, doi: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), doi)
    }
}

impl DoiResolver for HttpDoiResolver {
    async fn resolve(&self, doi: &str) -> Result<DoiResponse, DoiError> {
        let transport = |source: reqwest::Error| DoiError::Transport {
            doi: doi.to_string(),
            source,
        };

        let url = self.url_for(doi);
        debug!(%url, "resolving DOI");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, BIBLIOGRAPHY_ACCEPT)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!(doi, status, "DOI did not resolve");
        }
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(DoiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_doi() {
        let resolver = HttpDoiResolver::new("https://dx.doi.org/");
        assert_eq!(resolver.url_for("10.1029/abc"), "https://dx.doi.org/10.1029/abc");

        let bare = HttpDoiResolver::new("http://localhost:8080");
        assert_eq!(bare.url_for("10.1/x"), "http://localhost:8080/10.1/x");
    }

    #[test]
    fn test_explicit_base_url_is_kept() {
        let resolver = HttpDoiResolver::new("https://doi.example.org/");
        assert_eq!(resolver.base_url(), "https://doi.example.org/");
    }
}
