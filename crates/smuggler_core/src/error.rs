//! Error taxonomy for dataset operations.
//!
//! # Invariants
//! - Remote failures keep the collaborator error as `source()`.
//! - Conflict/missing errors are raised before any remote write.

use crate::api::ApiError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SmugglerResult<T> = Result<T, SmugglerError>;

/// Failure of a release or dataset operation.
#[derive(Debug)]
pub enum SmugglerError {
    /// Fetching the release for `tag` failed.
    ReleaseFetch { tag: String, source: ApiError },
    /// Writing the note body of the release for `tag` failed.
    ReleaseUpdate { tag: String, source: ApiError },
    /// A dataset with this name already exists in the note.
    DatasetExists { tag: String, name: String },
    /// No dataset with this name exists in the note.
    DatasetMissing { tag: String, name: String },
    /// Payload could not be serialized to YAML.
    Encode(serde_yaml::Error),
    /// Stored payload could not be decoded into the requested type.
    Decode {
        name: String,
        source: serde_yaml::Error,
    },
}

impl Display for SmugglerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReleaseFetch { tag, source } => {
                write!(f, "failed to get release `{tag}`: {source}")
            }
            Self::ReleaseUpdate { tag, source } => {
                write!(f, "failed to update release `{tag}`: {source}")
            }
            Self::DatasetExists { tag, name } => {
                write!(f, "dataset `{name}` already exists in release `{tag}`")
            }
            Self::DatasetMissing { tag, name } => {
                write!(f, "dataset `{name}` doesn't exist in release `{tag}`")
            }
            Self::Encode(err) => write!(f, "failed to encode dataset: {err}"),
            Self::Decode { name, source } => {
                write!(f, "failed to decode dataset `{name}`: {source}")
            }
        }
    }
}

impl Error for SmugglerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReleaseFetch { source, .. } | Self::ReleaseUpdate { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::DatasetExists { .. } | Self::DatasetMissing { .. } => None,
        }
    }
}
