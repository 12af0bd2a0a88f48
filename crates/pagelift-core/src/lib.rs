//! # pagelift-core
//!
//! Core types, traits, and abstractions for the pagelift back office.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other pagelift crates depend on: domain models, repository traits,
//! the shared error type, the structured logging schema, and the small pure
//! helpers (input sanitization, CSV encoding, landing-page HTML rendering)
//! used across the HTTP and data layers.

pub mod csv;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod page_html;
pub mod sanitize;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use page_html::render_landing_page_html;
pub use sanitize::{is_valid_email, is_valid_slug, sanitize_text};
pub use traits::*;
pub use uuid_utils::new_v7;
