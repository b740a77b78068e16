//! Request and Response models for the diagnostics API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request parameters and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{InvalidateParams, RelatedParams};
pub use responses::{
    CacheReport, ErrorResponse, HealthResponse, InvalidateResponse, StatsResponse,
};
