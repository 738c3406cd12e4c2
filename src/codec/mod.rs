//! Subscription payload codec.
//!
//! # Data Flow
//! ```text
//! fetched body
//!     → encoding.rs::is_encoded (cheap alphabet sniff)
//!     → encoding.rs::decode (base64 → UTF-8 text)
//!     → document parser
//!
//! dumped document
//!     → encoding.rs::encode (UTF-8 text → base64)
//!     → caller
//! ```
//!
//! # Design Decisions
//! - Decoding ignores whitespace and padding; providers wrap and truncate freely
//! - Both the standard and URL-safe alphabets are accepted on input
//! - Output always uses the padded standard alphabet

pub mod encoding;

pub use encoding::{decode, encode, is_encoded, CodecError};
