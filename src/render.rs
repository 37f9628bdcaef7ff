//! Terminal rendering of unlocked course lists.

use std::fmt::Write;

use yansi::Paint;

use crate::models::{CourseStatus, UnlockedCourseList};

pub const EMPTY_MESSAGE: &str = "No unlocked courses found.";

/// Render the list as the popup shows it: a program header, then one section
/// per non-empty group with retake courses badged.
pub fn render_text(list: &UnlockedCourseList, program: Option<&str>) -> String {
    let mut out = String::new();

    if let Some(program) = program.filter(|p| !p.is_empty()) {
        let _ = writeln!(out, "Program: BSc {program}");
    }

    if list.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_MESSAGE.bold());
        return out;
    }

    for (title, courses) in list.groups() {
        if courses.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{}", title.bold().underline());
        for course in courses {
            let _ = write!(out, "  {}: {}", course.code, course.name);
            if course.status == CourseStatus::Retake {
                let _ = write!(out, " {}", "[Retake]".yellow().bold());
            }
            out.push('\n');
        }
    }

    out
}
