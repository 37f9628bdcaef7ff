//! Grade cell interpretation.
//!
//! The grade column of the portal's curriculum report holds the attempt
//! history of a course, oldest first, e.g.
//! `"(2022-2023, Fall) [F] (2023-2024, Spring) [B+]"`. Only the final attempt
//! matters. A course that is currently running shows `[ - ]` as its grade.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Final `(<years>, <Season>) [<grade>]` group at the end of the cell.
static LAST_ATTEMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^()]+)\)\s+\[([^\[\]]+)\]\s*$").expect("valid attempt regex")
});

/// Portal academic season. Declaration order is chronological within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    fn from_portal_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Spring" => Some(Self::Spring),
            "Summer" => Some(Self::Summer),
            "Fall" => Some(Self::Fall),
            _ => None,
        }
    }
}

/// An academic term. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    pub year: u16,
    pub season: Season,
}

impl Term {
    /// Parse the parenthesized part of an attempt, e.g. `"2023-2024, Spring"`.
    ///
    /// The portal names sessions by academic year; the later calendar year is
    /// used for ordering.
    pub fn from_portal_str(s: &str) -> Option<Self> {
        let (years, season) = s.split_once(',')?;
        let year = years.rsplit('-').next()?.trim().parse().ok()?;
        let season = Season::from_portal_str(season)?;
        Some(Self { year, season })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.season, self.year)
    }
}

/// What the final attempt of a course means for the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// Lowest passing grade; the course may be retaken to improve it.
    Retake,
    /// Currently enrolled in the given term.
    InProgress(Term),
    Withdrawn,
    Failed,
}

/// Interpret a grade cell. `None` when the cell holds no recognizable attempt.
pub fn classify(cell: &str) -> Option<Outcome> {
    let caps = LAST_ATTEMPT_RE.captures(cell)?;
    let grade = caps[2].trim();

    let outcome = match grade {
        "-" => match Term::from_portal_str(&caps[1]) {
            Some(term) => Outcome::InProgress(term),
            None => {
                warn!(session = &caps[1], "Unrecognized session in running course");
                return None;
            }
        },
        "W" => Outcome::Withdrawn,
        "F" => Outcome::Failed,
        "D" => Outcome::Retake,
        _ => Outcome::Passed,
    };
    Some(outcome)
}
