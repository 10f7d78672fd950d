//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (static prefix check)
//!     → router.rs (EdgeDispatcher picks a destination)
//!     → Static: http::static_files
//!     → Proxy:  proxy::pipeline
//! ```
//!
//! # Design Decisions
//! - Built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always takes the same destination
//! - The two destinations are exclusive and exhaustive

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::{Destination, EdgeDispatcher};
