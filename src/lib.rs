//! Proxy subscription rewriter library.

// Core pipeline
pub mod codec;
pub mod document;
pub mod editor;
pub mod fetch;
pub mod pipeline;

// Transport
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::RewriterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Pipeline, SubscriptionRequest, SubscriptionResponse};
