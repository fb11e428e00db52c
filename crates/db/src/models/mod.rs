//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and, where rows are inserted from outside the engine, a
//! `Deserialize` create DTO.

pub mod document;
pub mod user;
