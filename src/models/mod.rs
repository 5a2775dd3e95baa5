//! Request and Response models for the cache engine API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ClearRequest, InvalidateRequest, SetRequest};
pub use responses::{
    ClearResponse, ErrorResponse, GetResponse, HealthResponse, InvalidateResponse, SetResponse,
};
