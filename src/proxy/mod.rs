//! Proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Request (not under the static prefix)
//!     → pipeline.rs (hop-by-hop strip, X-Forwarded-For)
//!     → director.rs (scheme/host := upstream target)
//!     → transport.rs (send via pooled client)
//!         wrapped by rewrite::RewriteTransport (body find-and-replace)
//!     → Response, or 502 on failure
//! ```
//!
//! # Design Decisions
//! - One upstream, fixed at startup
//! - Transport is a trait so the rewriter (and tests) can wrap it

pub mod director;
pub mod pipeline;
pub mod transport;

pub use director::{Director, TargetError, UpstreamTarget};
pub use pipeline::ProxyPipeline;
pub use transport::{HttpTransport, Transport, TransportError};
