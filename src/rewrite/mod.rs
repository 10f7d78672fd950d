//! Response body rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RewriteRule[] (config, ordered)
//!     → rules.rs (compile to PatternSet, fail fast on bad pattern)
//!     → Arc<PatternSet> shared by every request
//!
//! Per proxied response:
//!     inner transport returns response
//!     → transport.rs (buffer body, apply rules in order)
//!     → rebuilt body + exact Content-Length
//! ```
//!
//! # Design Decisions
//! - Whole-body buffering; rules may match across any byte boundary
//! - Rule order is fixed at startup and never changes

pub mod rules;
pub mod transport;

pub use rules::{PatternError, PatternSet, Rule};
pub use transport::RewriteTransport;
