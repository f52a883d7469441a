//! Static asset host for the prebuilt single-page application
//!
//! This module serves the UI, nothing more:
//! - precompressed assets from the configured directory
//! - the entry document for any unmatched route (client-side routing)
//! - GET /health - health check

mod routes;

pub use routes::create_router;
