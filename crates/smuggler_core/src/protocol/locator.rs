//! Dataset block location inside note text.
//!
//! # Responsibility
//! - Find fenced YAML blocks in arbitrary markdown and decode them.
//! - Report each dataset with the exact byte span it occupies.
//!
//! # Invariants
//! - Matches are returned in document order and never overlap.
//! - Offsets are byte offsets into the scanned string and always fall on
//!   char boundaries.
//! - Unparseable or unnamed YAML blocks are skipped, never fatal.

use crate::protocol::codec::{DATASET_KEY, DATASET_NAME_KEY};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

// Group 1 holds whole body lines; group 2 is the closing fence, which must be
// a line of exactly three backticks ending at a line break or end of input.
static YAML_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^```yaml[ \t]*\r?\n((?:[^\n]*\n)*?)(```)\r?(?:\n|\z)")
        .expect("valid yaml block regex")
});

/// One dataset block located in a note.
///
/// Offsets are only meaningful for the exact string the match came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMatch {
    /// Byte offset of the opening fence.
    pub start: usize,
    /// Byte length of the whole block, fences included. The line break after
    /// the closing fence is not part of the block.
    pub length: usize,
    /// Value of the `dataset-name` key.
    pub name: String,
    /// Text between the fences, without the line break before the closing
    /// fence.
    pub raw_body: String,
    /// Value of the `dataset` key; `Null` when the key is absent.
    pub payload: Value,
}

impl DatasetMatch {
    /// Byte offset one past the closing fence.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Finds dataset blocks in `note`, optionally restricted to `name`.
///
/// - With `Some(name)`, only blocks whose name equals `name` exactly are kept.
/// - With `None`, every block carrying a non-empty string name is kept.
///
/// A `dataset-name` that is not a YAML string (`dataset-name: 7`) never
/// matches, with or without a filter.
pub fn find_datasets(note: &str, name: Option<&str>) -> Vec<DatasetMatch> {
    let mut matches = Vec::new();

    for caps in YAML_BLOCK_RE.captures_iter(note) {
        let (Some(opening), Some(body), Some(closing)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let start = opening.start();
        let raw_body = trim_line_break(body.as_str());
        let Some((found_name, payload)) = decode_body(raw_body, start) else {
            continue;
        };

        let keep = match name {
            Some(wanted) => found_name == wanted,
            None => !found_name.is_empty(),
        };
        if !keep {
            continue;
        }

        matches.push(DatasetMatch {
            start,
            length: closing.end() - start,
            name: found_name,
            raw_body: raw_body.to_string(),
            payload,
        });
    }

    matches
}

/// Returns the earliest block named `name`, if any.
pub fn find_first_dataset(note: &str, name: &str) -> Option<DatasetMatch> {
    find_datasets(note, Some(name)).into_iter().next()
}

fn trim_line_break(body: &str) -> &str {
    let body = body.strip_suffix('\n').unwrap_or(body);
    body.strip_suffix('\r').unwrap_or(body)
}

fn decode_body(body: &str, offset: usize) -> Option<(String, Value)> {
    let document: Value = match serde_yaml::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            debug!(
                "event=dataset_block_skipped module=locator reason=parse_error offset={offset} error={err}"
            );
            return None;
        }
    };

    let Value::Mapping(mut mapping) = document else {
        return None;
    };
    let name = match mapping.get(DATASET_NAME_KEY) {
        Some(Value::String(name)) => name.clone(),
        Some(_) => {
            debug!(
                "event=dataset_block_skipped module=locator reason=non_string_name offset={offset}"
            );
            return None;
        }
        None => return None,
    };
    let payload = mapping.remove(DATASET_KEY).unwrap_or(Value::Null);
    Some((name, payload))
}
