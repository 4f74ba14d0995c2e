//! Schema-driven domain model for wall content.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep schema (walls, object types, fields) and data (items) in one
//!   consistent, serializable shape.
//!
//! # Invariants
//! - Every entity is identified by a stable id; item-to-schema links are
//!   id-based weak references.
//! - Field values are a closed tagged union keyed by the field type.

pub mod field;
pub mod item;
pub mod object_type;
pub mod wall;
