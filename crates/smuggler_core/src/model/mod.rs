//! Domain model for release-backed dataset storage.
//!
//! # Responsibility
//! - Define the records shared by protocol, API and service layers.
//!
//! # Invariants
//! - A dataset never exists as a standalone record; it lives encoded inside a
//!   release body or decoded transiently as a `DatasetMatch`.

pub mod release;
