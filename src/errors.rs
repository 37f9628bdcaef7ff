//! Error types for catalog loading and course resolution.

use crate::catalog::Partition;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The catalog could not be located, fetched in time, or parsed.
    #[error("catalog for program `{program}` is unavailable")]
    CatalogUnavailable {
        program: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    pub fn catalog_unavailable(program: &str, source: anyhow::Error) -> Self {
        Self::CatalogUnavailable {
            program: program.to_owned(),
            source,
        }
    }
}

/// A single catalog entry that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {partition} entry `{key}`: {reason}")]
pub struct MalformedEntry {
    pub partition: Partition,
    pub key: String,
    pub reason: String,
}
