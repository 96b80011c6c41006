//! Dataset block encoding.
//!
//! # Responsibility
//! - Serialize a `name + payload` pair into a fenced YAML block.
//!
//! # Invariants
//! - The YAML document is a mapping with `dataset-name` first, then `dataset`.
//! - The marker line is cosmetic; decoding never depends on it.
//! - The closing fence is not followed by a newline.

use crate::error::SmugglerError;
use serde::Serialize;

/// Mapping key holding the dataset name.
pub const DATASET_NAME_KEY: &str = "dataset-name";
/// Mapping key holding the dataset payload.
pub const DATASET_KEY: &str = "dataset";
/// Marker comment written at the top of every generated block.
pub const GENERATED_MARKER: &str =
    "# GENERATED BY https://github.com/oHaiyang/github-release-dataset, DO NOT MODIFY";

#[derive(Serialize)]
struct DatasetDocument<'a, T: ?Sized> {
    #[serde(rename = "dataset-name")]
    name: &'a str,
    dataset: &'a T,
}

/// Encodes one dataset as a complete fenced YAML block.
///
/// # Errors
/// - Returns `SmugglerError::Encode` when `payload` is not YAML-serializable.
pub fn encode_block<T>(name: &str, payload: &T) -> Result<String, SmugglerError>
where
    T: Serialize + ?Sized,
{
    let document = DatasetDocument {
        name,
        dataset: payload,
    };
    let yaml = serde_yaml::to_string(&document).map_err(SmugglerError::Encode)?;
    Ok(wrap_code_block(&yaml))
}

/// Wraps already serialized YAML in a marker-commented ```` ```yaml ```` fence.
///
/// `yaml` is expected to end with a newline, as `serde_yaml` output does.
pub fn wrap_code_block(yaml: &str) -> String {
    let mut block = String::with_capacity(yaml.len() + GENERATED_MARKER.len() + 16);
    block.push_str("```yaml\n");
    block.push_str(GENERATED_MARKER);
    block.push_str("\n\n");
    block.push_str(yaml);
    block.push_str("```");
    block
}
