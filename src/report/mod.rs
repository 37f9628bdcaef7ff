//! Grade report scraping.
//!
//! Parses the portal's "Grade Report by Curriculum" page into a
//! [`CompletedInfo`]. The page is a `.grade-report` container of tables: the
//! first summarizes the student (program, credits), the rest list curriculum
//! courses as `code | name | attempt history` rows.

pub mod grade;
pub mod source;

use std::sync::LazyLock;

use html_scraper::{ElementRef, Html, Selector};
use regex::Regex;
use tracing::{debug, warn};

use crate::models::{CompletedInfo, CourseRecord, CourseStatus};
use grade::{Outcome, Term};

pub use source::{CompletedCourseSource, CompletedInfoFile, GradeReportFile};

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".grade-report table").expect("valid table selector"));
static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid cell selector"));

static PROGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BSc(.*?),").expect("valid program regex"));
static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid integer regex"));

/// Visible text of an element with whitespace runs collapsed.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SEL).map(cell_text).collect()
}

/// Program name from the summary cell, e.g. `"BSc Computer Science & Engineering, ..."`.
pub fn extract_program(text: &str) -> Option<String> {
    let program = match PROGRAM_RE.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None if !text.contains("BSc") => text.split(',').next().unwrap_or("").trim().to_string(),
        None => return None,
    };
    (!program.is_empty()).then_some(program)
}

fn leading_int(text: &str) -> Option<u32> {
    LEADING_INT_RE.captures(text)?[1].parse().ok()
}

/// Read program and completed credits from the summary table.
fn parse_summary(table: ElementRef<'_>) -> (String, u32) {
    let rows: Vec<Vec<String>> = table.select(&ROW_SEL).map(row_cells).collect();

    let program = rows
        .first()
        .and_then(|cells| cells.get(5))
        .and_then(|text| extract_program(text));
    let credits = rows
        .get(2)
        .and_then(|cells| cells.get(2))
        .and_then(|text| leading_int(text));

    if program.is_none() {
        warn!("Could not read program from grade report summary");
    }
    if credits.is_none() {
        warn!("Could not read completed credits from grade report summary");
    }
    (program.unwrap_or_default(), credits.unwrap_or(0))
}

/// Parse a grade report page.
///
/// Withdrawn and failed courses are left out so they show up again as
/// available. Running courses of the current (earliest running) term count as
/// completed; courses already registered for a later term are left out.
pub fn parse_grade_report(html: &str) -> CompletedInfo {
    let document = Html::parse_document(html);
    let mut tables = document.select(&TABLE_SEL);

    let Some(summary) = tables.next() else {
        warn!("No grade report tables found");
        return CompletedInfo::default();
    };
    let (program, credits_completed) = parse_summary(summary);

    let mut attempts: Vec<(CourseRecord, Option<Term>)> = Vec::new();
    let mut skipped = 0usize;

    for table in tables {
        for row in table.select(&ROW_SEL).skip(1) {
            let cells = row_cells(row);
            if cells.len() <= 2 {
                continue;
            }
            let (code, name) = (cells[0].trim(), cells[1].trim());
            if code.is_empty() {
                continue;
            }

            let (status, term) = match grade::classify(&cells[2]) {
                Some(Outcome::Passed) => (CourseStatus::Completed, None),
                Some(Outcome::Retake) => (CourseStatus::Retake, None),
                Some(Outcome::InProgress(term)) => (CourseStatus::Completed, Some(term)),
                Some(Outcome::Withdrawn | Outcome::Failed) | None => {
                    skipped += 1;
                    continue;
                }
            };
            attempts.push((CourseRecord::new(code, name, status), term));
        }
    }

    let current_term = attempts.iter().filter_map(|(_, term)| *term).min();
    let completed: Vec<CourseRecord> = attempts
        .into_iter()
        .filter(|(_, term)| term.is_none() || *term == current_term)
        .map(|(record, _)| record)
        .collect();

    debug!(
        program = %program,
        credits_completed,
        completed = completed.len(),
        skipped,
        current_term = ?current_term.map(|t| t.to_string()),
        "Parsed grade report"
    );

    CompletedInfo {
        completed,
        program,
        credits_completed,
    }
}
