//! Shared entry point for "what has this student completed".

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::json::decode_with_context;
use crate::models::CompletedInfo;

/// Produces the resolver's input: completed courses, program and credits.
#[async_trait]
pub trait CompletedCourseSource: Send + Sync {
    async fn completed_info(&self) -> Result<CompletedInfo>;
}

/// A saved grade report page.
#[derive(Debug, Clone)]
pub struct GradeReportFile {
    path: PathBuf,
}

impl GradeReportFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CompletedCourseSource for GradeReportFile {
    async fn completed_info(&self) -> Result<CompletedInfo> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read grade report {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = html.len(), "Read grade report");
        Ok(super::parse_grade_report(&html))
    }
}

/// A `CompletedInfo` JSON document, as written by `unlocked report`.
#[derive(Debug, Clone)]
pub struct CompletedInfoFile {
    path: PathBuf,
}

impl CompletedInfoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CompletedCourseSource for CompletedInfoFile {
    async fn completed_info(&self) -> Result<CompletedInfo> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        decode_with_context(&body)
            .with_context(|| format!("invalid completed-course file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseRecord, CourseStatus};

    #[tokio::test]
    async fn completed_info_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completed.json");
        std::fs::write(
            &path,
            r#"{
                "completedCourseList": [
                    {"code": "CSC1101", "name": "Intro", "status": ""},
                    {"code": "MAT1102", "name": "Calculus", "status": "Retake"}
                ],
                "program": "CSE",
                "creditsCompleted": 24
            }"#,
        )
        .unwrap();

        let info = CompletedInfoFile::new(&path).completed_info().await.unwrap();
        assert_eq!(info.program, "CSE");
        assert_eq!(info.credits_completed, 24);
        assert_eq!(
            info.completed[1],
            CourseRecord::new("MAT1102", "Calculus", CourseStatus::Retake)
        );
    }

    #[tokio::test]
    async fn bad_status_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completed.json");
        std::fs::write(
            &path,
            r#"{"completedCourseList": [{"code": "X", "name": "Y", "status": "Failed"}], "program": "CSE", "creditsCompleted": 0}"#,
        )
        .unwrap();

        let err = CompletedInfoFile::new(&path).completed_info().await.unwrap_err();
        assert!(format!("{err:#}").contains("completedCourseList[0].status"), "{err:#}");
    }

    #[tokio::test]
    async fn missing_grade_report_file() {
        let source = GradeReportFile::new("/nonexistent/report.html");
        assert!(source.completed_info().await.is_err());
    }
}
