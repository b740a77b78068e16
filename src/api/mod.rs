//! API Module
//!
//! Diagnostics HTTP surface over a cache layer.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Statistics of both caches
//! - `DELETE /cache` - Invalidate the remote cache, optionally by `?pattern=`
//! - `DELETE /cache/related/:entity` - Invalidate entries related to an entity
//! - `DELETE /queries/:endpoint` - Invalidate query results of one endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
