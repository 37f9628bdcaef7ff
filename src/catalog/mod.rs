//! Per-program course catalogs.
//!
//! A catalog file maps course keys to `[prerequisites, name]` pairs, split into
//! a `main` and an `elective` partition:
//!
//! ```json
//! {
//!   "main":     { "CSC1102": [["Nil"], "Introduction to Programming"],
//!                 "CSC2211": [["CSC1102"], "Data Structure"] },
//!   "elective": { "CSC4180-1": [["80 Credits"], "Machine Learning"] }
//! }
//! ```
//!
//! Prerequisite lists are parsed once, here, into a [`Requirement`]. Keys may
//! carry a `-N` suffix so the same course can be listed more than once in a
//! JSON object; the course code is the part before the first `-`.

pub mod source;

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MalformedEntry;
use crate::json::decode_with_context;

pub use source::{CatalogSource, DirectorySource, HttpSource, StaticSource};

/// Prerequisite token meaning "no prerequisite".
const NIL_SENTINEL: &str = "Nil";

static CREDIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)\s*credits?$").expect("valid credit regex"));

/// Which half of the catalog an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Main,
    Elective,
}

impl Partition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Elective => "elective",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a student needs before a course becomes available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Always available.
    None,
    /// Available once at least this many credits are completed.
    Credits(u32),
    /// Available once every listed course is completed.
    Courses(Vec<String>),
}

impl Requirement {
    /// Parse a raw prerequisite list from a catalog file.
    fn from_tokens(tokens: &[String]) -> Result<Self, String> {
        let tokens: Vec<&str> = tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        let Some(first) = tokens.first() else {
            return Err("missing prerequisites".to_string());
        };
        if first.eq_ignore_ascii_case(NIL_SENTINEL) {
            return Ok(Self::None);
        }
        if let Some(caps) = CREDIT_RE.captures(first) {
            return caps[1]
                .parse()
                .map(Self::Credits)
                .map_err(|e| format!("credit threshold `{first}` out of range: {e}"));
        }
        if first.to_ascii_lowercase().contains("credit") {
            return Err(format!("unrecognized credit requirement `{first}`"));
        }

        Ok(Self::Courses(tokens.iter().map(|t| t.to_string()).collect()))
    }

    /// Whether a student with the given history meets this requirement.
    pub fn is_met(&self, completed: &HashSet<&str>, credits_completed: u32) -> bool {
        match self {
            Self::None => true,
            Self::Credits(threshold) => credits_completed >= *threshold,
            Self::Courses(codes) => codes.iter().all(|c| completed.contains(c.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub requirement: Requirement,
}

/// A program's catalog with entries in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub main: Vec<CatalogEntry>,
    pub elective: Vec<CatalogEntry>,
    /// Entries dropped while loading, either malformed or repeating an earlier code.
    pub skipped: Vec<MalformedEntry>,
}

#[derive(Deserialize)]
struct RawCatalog {
    main: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    elective: IndexMap<String, serde_json::Value>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// Fails only when the document itself is unusable. Individual bad entries
    /// are logged and collected in [`Catalog::skipped`].
    pub fn parse(body: &str) -> Result<Self> {
        let raw: RawCatalog = decode_with_context(body).context("invalid catalog document")?;

        let mut catalog = Catalog::default();
        let mut seen = HashSet::new();

        for (partition, entries) in [(Partition::Main, raw.main), (Partition::Elective, raw.elective)] {
            for (key, value) in entries {
                let entry = match parse_entry(&key, &value) {
                    Ok(entry) => entry,
                    Err(reason) => {
                        let skipped = MalformedEntry { partition, key, reason };
                        warn!(
                            partition = %skipped.partition,
                            key = %skipped.key,
                            reason = %skipped.reason,
                            "Skipping malformed catalog entry"
                        );
                        catalog.skipped.push(skipped);
                        continue;
                    }
                };

                if !seen.insert(entry.code.clone()) {
                    debug!(partition = %partition, key = %key, code = %entry.code, "Skipping repeated catalog code");
                    catalog.skipped.push(MalformedEntry {
                        partition,
                        key,
                        reason: format!("code `{}` already listed", entry.code),
                    });
                    continue;
                }

                catalog.entries_mut(partition).push(entry);
            }
        }

        Ok(catalog)
    }

    /// Both partitions in resolution order.
    pub fn partitions(&self) -> [(Partition, &[CatalogEntry]); 2] {
        [
            (Partition::Main, self.main.as_slice()),
            (Partition::Elective, self.elective.as_slice()),
        ]
    }

    pub fn len(&self) -> usize {
        self.main.len() + self.elective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries_mut(&mut self, partition: Partition) -> &mut Vec<CatalogEntry> {
        match partition {
            Partition::Main => &mut self.main,
            Partition::Elective => &mut self.elective,
        }
    }
}

/// Strip the disambiguating `-N` suffix from a catalog key.
pub fn normalize_code(key: &str) -> &str {
    key.split('-').next().unwrap_or(key).trim()
}

fn parse_entry(key: &str, value: &serde_json::Value) -> Result<CatalogEntry, String> {
    let code = normalize_code(key);
    if code.is_empty() {
        return Err("empty course code".to_string());
    }

    let pair = value
        .as_array()
        .ok_or_else(|| "expected a [prerequisites, name] pair".to_string())?;
    let (prereqs, name) = match pair.as_slice() {
        [prereqs, name, ..] => (prereqs, name),
        _ => return Err("missing prerequisites or name".to_string()),
    };

    let tokens = prereqs
        .as_array()
        .ok_or_else(|| "prerequisites must be a list".to_string())?
        .iter()
        .map(|t| t.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| "prerequisites must be strings".to_string())?;

    let name = name
        .as_str()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "missing course name".to_string())?;

    Ok(CatalogEntry {
        code: code.to_string(),
        name: name.to_string(),
        requirement: Requirement::from_tokens(&tokens)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // --- Requirement::from_tokens ---

    #[test]
    fn nil_sentinel_is_unconditional() {
        assert_eq!(Requirement::from_tokens(&tokens(&["Nil"])), Ok(Requirement::None));
        assert_eq!(Requirement::from_tokens(&tokens(&["nil"])), Ok(Requirement::None));
    }

    #[test]
    fn blank_prerequisite_list_is_rejected() {
        assert!(Requirement::from_tokens(&[]).is_err());
        assert!(Requirement::from_tokens(&tokens(&[""])).is_err());
        assert!(Requirement::from_tokens(&tokens(&["  ", ""])).is_err());
    }

    #[test]
    fn credit_tokens() {
        assert_eq!(
            Requirement::from_tokens(&tokens(&["80 Credits"])),
            Ok(Requirement::Credits(80))
        );
        assert_eq!(
            Requirement::from_tokens(&tokens(&["  100 credit "])),
            Ok(Requirement::Credits(100))
        );
        assert!(Requirement::from_tokens(&tokens(&["Some Credits"])).is_err());
    }

    #[test]
    fn course_list_keeps_every_code() {
        assert_eq!(
            Requirement::from_tokens(&tokens(&["CSC1101", " CSC1102 "])),
            Ok(Requirement::Courses(tokens(&["CSC1101", "CSC1102"])))
        );
    }

    #[test]
    fn course_requirement_is_conjunctive() {
        let req = Requirement::Courses(tokens(&["101", "102"]));
        let only_first: HashSet<&str> = ["101"].into_iter().collect();
        let both: HashSet<&str> = ["101", "102"].into_iter().collect();
        assert!(!req.is_met(&only_first, 0));
        assert!(req.is_met(&both, 0));
    }

    #[test]
    fn credit_requirement_threshold() {
        let none = HashSet::new();
        assert!(!Requirement::Credits(80).is_met(&none, 79));
        assert!(Requirement::Credits(80).is_met(&none, 80));
    }

    // --- normalize_code ---

    #[test]
    fn normalize_strips_suffix() {
        assert_eq!(normalize_code("CSC4180-1"), "CSC4180");
        assert_eq!(normalize_code("CSC4180"), "CSC4180");
        assert_eq!(normalize_code(" MAT1205 -2"), "MAT1205");
    }

    // --- Catalog::parse ---

    #[test]
    fn parse_preserves_declaration_order() {
        let body = r#"{
            "main": {
                "301": [["Nil"], "Algorithms"],
                "201": [["101"], "Data Structures"],
                "250": [["80 Credits"], "Research Methods"]
            },
            "elective": {
                "410": [["301"], "Compilers"]
            }
        }"#;
        let catalog = Catalog::parse(body).unwrap();

        let codes: Vec<&str> = catalog.main.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["301", "201", "250"]);
        assert_eq!(catalog.main[2].requirement, Requirement::Credits(80));
        assert_eq!(catalog.elective.len(), 1);
        assert!(catalog.skipped.is_empty());
    }

    #[test]
    fn elective_partition_is_optional() {
        let catalog = Catalog::parse(r#"{"main": {"101": [["Nil"], "Intro"]}}"#).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.elective.is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let body = r#"{
            "main": {
                "101": [["Nil"], "Intro"],
                "102": [["Nil"]],
                "103": "Calculus",
                "104": [["Nil"], "   "],
                "105": [[7], "Physics"],
                "106": [["Nil"], "Chemistry"],
                "107": [[], "Capstone"],
                "108": [[""], "Thesis"]
            },
            "elective": {}
        }"#;
        let catalog = Catalog::parse(body).unwrap();

        let codes: Vec<&str> = catalog.main.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["101", "106"]);

        let skipped: Vec<&str> = catalog.skipped.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(skipped, ["102", "103", "104", "105", "107", "108"]);
        assert!(catalog.skipped.iter().all(|s| s.partition == Partition::Main));
    }

    #[test]
    fn repeated_codes_keep_first_declaration() {
        let body = r#"{
            "main": { "CSC4180-1": [["Nil"], "Machine Learning"] },
            "elective": {
                "CSC4180-2": [["Nil"], "Machine Learning"],
                "CSC4181": [["Nil"], "Deep Learning"]
            }
        }"#;
        let catalog = Catalog::parse(body).unwrap();

        assert_eq!(catalog.main[0].code, "CSC4180");
        assert_eq!(catalog.elective.len(), 1);
        assert_eq!(catalog.elective[0].code, "CSC4181");
        assert_eq!(catalog.skipped.len(), 1);
        assert_eq!(catalog.skipped[0].partition, Partition::Elective);
    }

    #[test]
    fn missing_main_is_an_error() {
        assert!(Catalog::parse(r#"{"elective": {}}"#).is_err());
        assert!(Catalog::parse("not json").is_err());
    }
}
