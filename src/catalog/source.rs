//! Where catalog documents come from.
//!
//! Sources only fetch raw text; parsing and timeouts are handled by the
//! resolver so every source fails the same way.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tracing::trace;
use url::Url;

/// Fetches the raw catalog document for a program.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, program: &str) -> Result<String>;
}

/// Program identifiers end up in file names and URL paths.
pub fn validate_program(program: &str) -> Result<()> {
    if program.trim().is_empty() {
        bail!("program identifier is empty");
    }
    if program.contains(['/', '\\']) || program.contains("..") {
        bail!("program identifier `{program}` contains a path separator");
    }
    if program.contains(['?', '#', ':']) {
        bail!("program identifier `{program}` contains a URL delimiter");
    }
    Ok(())
}

/// Reads `<root>/<program>.json` from the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl CatalogSource for DirectorySource {
    async fn fetch(&self, program: &str) -> Result<String> {
        validate_program(program)?;
        let path = self.root.join(format!("{program}.json"));
        trace!(path = %path.display(), "Reading catalog file");
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Fetches `<base_url>/<program>.json` over HTTP.
pub struct HttpSource {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // `Url::join` replaces the last path segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    fn catalog_url(&self, program: &str) -> Result<Url> {
        self.base_url
            .join(&format!("{program}.json"))
            .with_context(|| format!("invalid catalog URL for `{program}`"))
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    async fn fetch(&self, program: &str) -> Result<String> {
        validate_program(program)?;
        let url = self.catalog_url(program)?;
        trace!(url = %url, "Fetching catalog");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("catalog request to {url} was rejected"))?;
        response
            .text()
            .await
            .with_context(|| format!("failed to read catalog body from {url}"))
    }
}

/// In-memory catalogs keyed by program.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, program: impl Into<String>, document: impl Into<String>) -> Self {
        self.documents.insert(program.into(), document.into());
        self
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn fetch(&self, program: &str) -> Result<String> {
        validate_program(program)?;
        match self.documents.get(program) {
            Some(doc) => Ok(doc.clone()),
            None => bail!("no catalog registered for `{program}`"),
        }
    }
}
