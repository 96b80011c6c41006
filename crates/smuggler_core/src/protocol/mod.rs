//! Release-note text protocol.
//!
//! # Responsibility
//! - Encode datasets into fenced YAML blocks (`codec`).
//! - Locate and decode such blocks in note text (`locator`).
//! - Insert, replace and remove blocks without touching other text (`splice`).
//!
//! # Invariants
//! - Every function here is pure: note text in, note text or matches out.
//! - Encoding a dataset then locating it recovers the same name and an equal
//!   payload.

pub mod codec;
pub mod locator;
pub mod splice;
