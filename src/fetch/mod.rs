//! Upstream subscription retrieval.
//!
//! # Data Flow
//! ```text
//! subscription URL
//!     → client.rs::fetch (single GET, non-2xx is an error)
//!     → client.rs::resolve_document (fetch, then resolve_body)
//!         .yaml/.yml path      → document::parse
//!         base64-looking body  → codec::decode → document::parse
//!         anything else        → UnsupportedFormat
//! ```
//!
//! # Design Decisions
//! - Extension check runs before content sniffing (cheap first)
//! - No retries; a failed fetch fails the invocation
//! - Timeouts are owned by the HTTP client configuration, not per call

pub mod client;
pub mod types;

pub use client::{has_markup_extension, resolve_body, SubscriptionFetcher};
pub use types::{FetchError, FetchErrorKind};
