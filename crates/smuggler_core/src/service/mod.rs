//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate protocol functions and the release API into dataset CRUD.
//! - Keep CLI and embedding callers decoupled from transport details.

pub mod release_store;
