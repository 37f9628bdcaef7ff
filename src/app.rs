//! Wiring between configuration, the scraper, the resolver and the cache.

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cache::{self, Cached, FileCache};
use crate::catalog::{DirectorySource, HttpSource};
use crate::config::Config;
use crate::models::{CompletedInfo, UnlockedCourseList};
use crate::report::CompletedCourseSource;
use crate::resolver::Resolver;

/// Everything a command needs, built once from [`Config`].
pub struct App {
    resolver: Resolver,
    cache: FileCache,
}

/// A resolution result together with the data it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub info: CompletedInfo,
    pub unlocked: UnlockedCourseList,
}

impl App {
    /// Build the catalog source, resolver and cache described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let resolver = match &config.catalog_url {
            Some(url) => {
                info!(url = %url, "Using remote catalogs");
                Resolver::new(HttpSource::new(url.clone(), config.catalog_timeout)?)
            }
            None => {
                info!(dir = %config.catalog_dir.display(), "Using local catalogs");
                Resolver::new(DirectorySource::new(&config.catalog_dir))
            }
        }
        .with_policy(config.retake_policy)
        .with_timeout(config.catalog_timeout);

        Ok(Self::from_parts(resolver, FileCache::new(&config.cache_path)))
    }

    pub fn from_parts(resolver: Resolver, cache: FileCache) -> Self {
        Self { resolver, cache }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve without touching the cache.
    pub async fn resolve(&self, info: &CompletedInfo) -> Result<UnlockedCourseList> {
        let unlocked = self
            .resolver
            .resolve(&info.program, &info.completed, info.credits_completed)
            .await?;
        Ok(unlocked)
    }

    /// The last cached snapshot, if both halves are present and current.
    pub async fn cached(&self) -> Result<Option<Snapshot>> {
        let info: Option<Cached<CompletedInfo>> = self.cache.get(cache::KEY_COMPLETED_INFO).await?;
        let unlocked: Option<Cached<UnlockedCourseList>> =
            self.cache.get(cache::KEY_UNLOCKED_COURSES).await?;

        Ok(match (info, unlocked) {
            (Some(info), Some(unlocked)) => Some(Snapshot {
                info: info.value,
                unlocked: unlocked.value,
            }),
            _ => None,
        })
    }

    /// Scrape fresh data, resolve it and cache both steps.
    ///
    /// The scraped data is cached before resolving, so a catalog failure still
    /// leaves the latest grade report available.
    pub async fn reload(&self, source: &dyn CompletedCourseSource) -> Result<Snapshot> {
        let info = source
            .completed_info()
            .await
            .context("Failed to read completed courses")?;
        if info.program.is_empty() {
            warn!("Grade report did not name a program");
            bail!("could not determine the program from the grade report");
        }
        self.cache.set(cache::KEY_COMPLETED_INFO, &info).await?;

        let unlocked = self.resolve(&info).await?;
        self.cache.set(cache::KEY_UNLOCKED_COURSES, &unlocked).await?;

        info!(
            program = %info.program,
            completed = info.completed.len(),
            unlocked = unlocked.main.len() + unlocked.elective.len(),
            "Unlocked courses refreshed"
        );
        Ok(Snapshot { info, unlocked })
    }
}
