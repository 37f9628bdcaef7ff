//! Course unlock resolution for a student portal grade report.
//!
//! [`report`] scrapes completed courses from a grade report page, [`catalog`]
//! loads a program's prerequisite catalog, and [`resolver`] combines the two
//! into the list of courses the student can take next.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod json;
pub mod logging;
pub mod models;
pub mod render;
pub mod report;
pub mod resolver;
pub mod utils;

pub use errors::{MalformedEntry, ResolveError};
pub use models::{CompletedInfo, CourseRecord, CourseStatus, UnlockedCourse, UnlockedCourseList};
pub use resolver::{Resolver, RetakePolicy, unlock};
