//! Rewriting reverse proxy library.
//!
//! Forwards requests to a single upstream, rewrites response bodies with an
//! ordered list of regex substitutions, and serves a static tree under a
//! URL prefix.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod rewrite;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
