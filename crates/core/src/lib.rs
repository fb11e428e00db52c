//! Domain core for Berita Acara document approval.
//!
//! - [`document`] -- document, stage, status and history types.
//! - [`workflow`] -- the pure approval state machine shared by BAPB and BAPP.
//! - [`engine`] -- the async [`engine::ApprovalEngine`] driving the state
//!   machine against a [`repository::DocumentRepository`].
//! - [`memory`] -- in-memory collaborators for tests and local development.

pub mod blob;
pub mod document;
pub mod engine;
pub mod error;
pub mod memory;
pub mod paging;
pub mod payload;
pub mod repository;
pub mod roles;
pub mod types;
pub mod workflow;
