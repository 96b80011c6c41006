//! Core of Smuggler: named YAML datasets stored inside release notes.
//!
//! The release-note text protocol lives in [`protocol`]; [`ReleaseStore`]
//! drives it against any [`ReleaseApi`] implementation.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod service;

pub use api::github::GithubReleaseApi;
pub use api::{ApiError, ApiResult, ReleaseApi};
pub use config::{ConfigError, SmugglerConfig};
pub use error::{SmugglerError, SmugglerResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::release::{Release, ReleaseId};
pub use protocol::codec::{
    encode_block, wrap_code_block, DATASET_KEY, DATASET_NAME_KEY, GENERATED_MARKER,
};
pub use protocol::locator::{find_datasets, find_first_dataset, DatasetMatch};
pub use protocol::splice::{insert_block, splice_note, InsertPosition};
pub use service::release_store::{DatasetTransform, DatasetUpdate, ReleaseStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
