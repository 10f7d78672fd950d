//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → request.rs (request ID assigned and echoed)
//!     → routing::EdgeDispatcher
//!         → static_files.rs (prefix stripped, ServeDir)
//!         → proxy::ProxyPipeline (director, rewrite transport)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod static_files;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
pub use static_files::StaticFiles;
