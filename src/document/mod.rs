//! Configuration document model.
//!
//! # Data Flow
//! ```text
//! YAML text
//!     → tree.rs::parse (serde_yaml, root must be a mapping)
//!     → Document (edited in place by the editor subsystem)
//!     → tree.rs::dump
//!     → YAML text
//! ```
//!
//! # Design Decisions
//! - The tree stays untyped; unknown fields survive a round trip untouched
//! - An empty document is an empty mapping, not an error
//! - Formatting is not preserved, only structure

pub mod tree;

pub use tree::{dump, parse, Document, DocumentError};
