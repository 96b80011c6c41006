//! Release API contracts.
//!
//! # Responsibility
//! - Define the remote collaborator used to read and write release notes.
//! - Keep transport details out of the dataset orchestration layer.
//!
//! # Invariants
//! - Implementations never retry internally; every failure is returned.
//! - `edit_release` replaces the whole note body.

use crate::model::release::{Release, ReleaseId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod github;

pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-level failure reported by a release API implementation.
#[derive(Debug)]
pub enum ApiError {
    /// Request could not be sent or the response could not be read.
    Http(reqwest::Error),
    /// Remote answered with a non-success status.
    Status { status: u16, message: String },
    /// Remote answered with a payload that does not decode.
    InvalidResponse(String),
    /// Any other collaborator failure (fakes, misconfiguration).
    Other(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "{err}"),
            Self::Status { status, message } => {
                write!(f, "remote responded with HTTP {status}: {message}")
            }
            Self::InvalidResponse(message) => write!(f, "invalid remote response: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Status { .. } | Self::InvalidResponse(_) | Self::Other(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// Remote release operations the dataset store depends on.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Fetches one release by its tag.
    async fn get_release_by_tag(&self, tag: &str) -> ApiResult<Release>;
    /// Replaces the note body of release `id`.
    async fn edit_release(&self, id: ReleaseId, tag: &str, body: &str) -> ApiResult<()>;
}
