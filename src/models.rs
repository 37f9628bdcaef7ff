//! Structured types exchanged between the scraper, the resolver and the
//! renderer/cache.
//!
//! The wire shapes match what the portal extension stores: completion status is
//! the empty string or `"Retake"`, and unlocked courses are `[code, name, status]`
//! triples grouped as `[main, elective]`.

use serde::{Deserialize, Serialize};

/// Completion status of a course taken by the student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseStatus {
    /// Completed normally; nothing left to do.
    #[default]
    #[serde(rename = "")]
    Completed,
    /// Passed with the lowest grade (or otherwise flagged); may be retaken.
    Retake,
}

impl CourseStatus {
    pub fn is_retake(self) -> bool {
        matches!(self, Self::Retake)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "",
            Self::Retake => "Retake",
        }
    }
}

/// A course that appears on the student's grade report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub status: CourseStatus,
}

impl CourseRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>, status: CourseStatus) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            status,
        }
    }
}

/// Everything the scraper extracts from a grade report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedInfo {
    #[serde(rename = "completedCourseList")]
    pub completed: Vec<CourseRecord>,
    pub program: String,
    pub credits_completed: u32,
}

/// A course the student may enroll in, serialized as `[code, name, status]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(String, String, CourseStatus)",
    into = "(String, String, CourseStatus)"
)]
pub struct UnlockedCourse {
    pub code: String,
    pub name: String,
    pub status: CourseStatus,
}

impl From<(String, String, CourseStatus)> for UnlockedCourse {
    fn from((code, name, status): (String, String, CourseStatus)) -> Self {
        Self { code, name, status }
    }
}

impl From<UnlockedCourse> for (String, String, CourseStatus) {
    fn from(course: UnlockedCourse) -> Self {
        (course.code, course.name, course.status)
    }
}

/// Unlocked courses split by catalog partition, serialized as `[main, elective]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(Vec<UnlockedCourse>, Vec<UnlockedCourse>)",
    into = "(Vec<UnlockedCourse>, Vec<UnlockedCourse>)"
)]
pub struct UnlockedCourseList {
    pub main: Vec<UnlockedCourse>,
    pub elective: Vec<UnlockedCourse>,
}

impl UnlockedCourseList {
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.elective.is_empty()
    }

    /// Groups in display order, paired with their headings.
    pub fn groups(&self) -> [(&'static str, &[UnlockedCourse]); 2] {
        [
            ("Main Courses:", self.main.as_slice()),
            ("Elective/Major Courses:", self.elective.as_slice()),
        ]
    }

    /// Every unlocked code, main group first.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.main
            .iter()
            .chain(self.elective.iter())
            .map(|c| c.code.as_str())
    }
}

impl From<(Vec<UnlockedCourse>, Vec<UnlockedCourse>)> for UnlockedCourseList {
    fn from((main, elective): (Vec<UnlockedCourse>, Vec<UnlockedCourse>)) -> Self {
        Self { main, elective }
    }
}

impl From<UnlockedCourseList> for (Vec<UnlockedCourse>, Vec<UnlockedCourse>) {
    fn from(list: UnlockedCourseList) -> Self {
        (list.main, list.elective)
    }
}
