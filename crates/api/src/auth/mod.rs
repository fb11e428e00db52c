//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Tokens are issued by an external identity service; this crate only
//! verifies them. The role claim is informational: the approval engine
//! always re-reads the actor's role from the database.

pub mod jwt;
