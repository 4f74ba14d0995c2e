//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep schema knowledge (defaults, validation, display rules) out of
//!   the storage layer.

pub mod display;
pub mod export;
pub mod item_service;
pub mod migration;
pub mod relationship;
pub mod schema_service;
