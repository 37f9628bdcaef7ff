//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Catalog for the `CSE` program used across tests.
pub const CSE_CATALOG: &str = include_str!("../fixtures/CSE.json");

/// Grade report page for a student in their second year.
pub const GRADE_REPORT: &str = include_str!("../fixtures/grade_report.html");

/// Write the CSE catalog into `dir` and return the directory path.
pub fn catalog_dir(dir: &Path) -> PathBuf {
    let catalogs = dir.join("catalogs");
    std::fs::create_dir_all(&catalogs).expect("create catalog dir");
    std::fs::write(catalogs.join("CSE.json"), CSE_CATALOG).expect("write catalog");
    catalogs
}

/// Write the grade report into `dir` and return its path.
pub fn grade_report(dir: &Path) -> PathBuf {
    let path = dir.join("grade_report.html");
    std::fs::write(&path, GRADE_REPORT).expect("write grade report");
    path
}
