//! Course unlock resolution.
//!
//! Given a student's completed courses and their program's catalog, work out
//! which courses they can enroll in next. Courses flagged for retake are always
//! offered first in the main group; every other course is offered when its
//! requirement is met and the student has not already completed it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::catalog::{Catalog, CatalogSource, Partition};
use crate::errors::ResolveError;
use crate::models::{CourseRecord, CourseStatus, UnlockedCourse, UnlockedCourseList};
use crate::utils::log_if_slow;

/// Default upper bound on a single catalog fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches slower than this are logged.
const SLOW_FETCH: Duration = Duration::from_millis(500);

/// How a retake-flagged course interacts with its own catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetakePolicy {
    /// A retake course counts as completed, so its catalog entry is never
    /// offered a second time.
    #[default]
    Suppress,
    /// The retake entry and an eligible main catalog entry for the same code
    /// are both listed. Elective entries for a retake code are still dropped,
    /// since the retake already sits in the main group.
    KeepBoth,
}

/// Resolves unlocked courses against catalogs from a [`CatalogSource`].
///
/// Holds no per-student state; one instance can serve concurrent calls.
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn CatalogSource>,
    policy: RetakePolicy,
    timeout: Duration,
}

impl Resolver {
    pub fn new(source: impl CatalogSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            policy: RetakePolicy::default(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RetakePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> RetakePolicy {
        self.policy
    }

    /// Fetch and parse the catalog for `program`.
    pub async fn load_catalog(&self, program: &str) -> Result<Catalog, ResolveError> {
        let started = Instant::now();
        let body = match tokio::time::timeout(self.timeout, self.source.fetch(program)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(ResolveError::catalog_unavailable(program, e)),
            Err(_) => {
                return Err(ResolveError::catalog_unavailable(
                    program,
                    anyhow::anyhow!("catalog fetch timed out after {:?}", self.timeout),
                ));
            }
        };

        let elapsed = log_if_slow(started, SLOW_FETCH, "catalog fetch");

        let catalog =
            Catalog::parse(&body).map_err(|e| ResolveError::catalog_unavailable(program, e))?;
        debug!(
            program,
            entries = catalog.len(),
            skipped = catalog.skipped.len(),
            elapsed = ?elapsed,
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Compute the courses a student can take next.
    #[instrument(skip(self, completed), fields(completed_count = completed.len()))]
    pub async fn resolve(
        &self,
        program: &str,
        completed: &[CourseRecord],
        credits_completed: u32,
    ) -> Result<UnlockedCourseList, ResolveError> {
        let catalog = self.load_catalog(program).await?;
        let unlocked = unlock(&catalog, completed, credits_completed, self.policy);
        debug!(
            main = unlocked.main.len(),
            elective = unlocked.elective.len(),
            "Resolved unlocked courses"
        );
        Ok(unlocked)
    }
}

/// The resolution pass over an already-loaded catalog. Pure and deterministic.
pub fn unlock(
    catalog: &Catalog,
    completed: &[CourseRecord],
    credits_completed: u32,
    policy: RetakePolicy,
) -> UnlockedCourseList {
    // Any course on the report, retake or not, satisfies prerequisites.
    let satisfied: HashSet<&str> = completed.iter().map(|c| c.code.as_str()).collect();
    let passed: HashSet<&str> = completed
        .iter()
        .filter(|c| !c.status.is_retake())
        .map(|c| c.code.as_str())
        .collect();

    let mut unlocked = UnlockedCourseList {
        main: completed
            .iter()
            .filter(|c| c.status.is_retake())
            .map(|c| UnlockedCourse {
                code: c.code.clone(),
                name: c.name.clone(),
                status: CourseStatus::Retake,
            })
            .collect(),
        elective: Vec::new(),
    };

    for (partition, entries) in catalog.partitions() {
        let done = match (policy, partition) {
            (RetakePolicy::KeepBoth, Partition::Main) => &passed,
            _ => &satisfied,
        };
        let group = match partition {
            Partition::Main => &mut unlocked.main,
            Partition::Elective => &mut unlocked.elective,
        };
        group.extend(
            entries
                .iter()
                .filter(|e| !done.contains(e.code.as_str()))
                .filter(|e| e.requirement.is_met(&satisfied, credits_completed))
                .map(|e| UnlockedCourse {
                    code: e.code.clone(),
                    name: e.name.clone(),
                    status: CourseStatus::Completed,
                }),
        );
    }

    unlocked
}
