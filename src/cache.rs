//! Versioned key-value cache for scraped and resolved data.
//!
//! Backed by a single JSON file. Every value is wrapped in an envelope that
//! records the schema version it was written with, so a payload written by an
//! older build is treated as a miss instead of being misread.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::json::decode_with_context;

/// Bump whenever a cached payload type changes shape.
pub const SCHEMA_VERSION: u32 = 1;

/// Key for the scraped [`crate::models::CompletedInfo`].
pub const KEY_COMPLETED_INFO: &str = "completedInfo";

/// Key for the last [`crate::models::UnlockedCourseList`].
pub const KEY_UNLOCKED_COURSES: &str = "unlockedCoursesList";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    schema_version: u32,
    stored_at: DateTime<Utc>,
    payload: serde_json::Value,
}

/// A cached value together with when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<IndexMap<String, Envelope>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => decode_with_context(&body)
                .with_context(|| format!("corrupt cache file {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(IndexMap::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    async fn store(&self, entries: &IndexMap<String, Envelope>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }

    /// Retrieve a value by key, or `None` if absent, stale, or undecodable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Cached<T>>> {
        let mut entries = self.load().await?;
        let Some(envelope) = entries.swap_remove(key) else {
            return Ok(None);
        };

        if envelope.schema_version != SCHEMA_VERSION {
            debug!(
                key,
                found = envelope.schema_version,
                expected = SCHEMA_VERSION,
                "Ignoring cache entry from another schema version"
            );
            return Ok(None);
        }

        match serde_json::from_value(envelope.payload) {
            Ok(value) => Ok(Some(Cached {
                value,
                stored_at: envelope.stored_at,
            })),
            Err(e) => {
                warn!(key, error = %e, "Ignoring undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Insert or replace the value stored under `key`.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.load().await.unwrap_or_else(|e| {
            warn!(error = format!("{e:#}"), "Discarding unreadable cache file");
            IndexMap::new()
        });
        entries.insert(
            key.to_owned(),
            Envelope {
                schema_version: SCHEMA_VERSION,
                stored_at: Utc::now(),
                payload: serde_json::to_value(value)
                    .with_context(|| format!("failed to encode cache entry `{key}`"))?,
            },
        );
        self.store(&entries).await?;
        debug!(key, path = %self.path.display(), "Cache entry written");
        Ok(())
    }

    /// Drop a single key. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.load().await?;
        let present = entries.shift_remove(key).is_some();
        if present {
            self.store(&entries).await?;
        }
        Ok(present)
    }
}
