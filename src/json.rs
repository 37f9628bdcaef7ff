//! JSON decoding with error messages that point at the offending spot.
//!
//! Catalog files are hand-edited, so a bare "invalid type" from serde is not
//! much help. Errors produced here carry the serde path, a short description of
//! the mismatch and a snippet of the line with a caret under the failing column.

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Characters of context shown on either side of the error column.
const SNIPPET_RADIUS: usize = 12;

/// Deserialize `body`, annotating failures with path, position and a snippet.
pub fn decode_with_context<T: DeserializeOwned>(body: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        let (line, column) = (inner.line(), inner.column());

        let full = inner.to_string();
        let suffix = format!(" at line {line} column {column}");
        let summary = describe_mismatch(full.strip_suffix(&suffix).unwrap_or(&full));

        let location = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!("at '{path}': ")
        };
        anyhow::anyhow!(
            "{location}{summary} (line {line} col {column})\n{}",
            snippet(body, line, column)
        )
    })
}

/// Rewrite "invalid type: X, expected Y" as "expected Y, got X".
fn describe_mismatch(msg: &str) -> String {
    if let Some(rest) = msg.split_once("invalid type: ").map(|(_, r)| r)
        && let Some((actual, expected)) = rest.split_once(", expected ")
    {
        return format!("expected {}, got {}", expected.trim(), actual);
    }
    msg.to_string()
}

fn snippet(body: &str, line: usize, column: usize) -> String {
    let text = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if text.is_empty() {
        return "(empty line)".to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let at = column.saturating_sub(1).min(chars.len());
    let start = at.saturating_sub(SNIPPET_RADIUS);
    let end = (at + SNIPPET_RADIUS).min(chars.len());
    let window: String = chars[start..end].iter().collect();

    format!("...{window}...\n   {}^", " ".repeat(at - start))
}
