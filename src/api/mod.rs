//! API Module
//!
//! HTTP handlers and routing for the cache engine REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value through the tier chain
//! - `POST /invalidate` - Remove entries by key substring and/or tags
//! - `POST /clear` - Wipe selected tiers
//! - `GET /stats` - Get aggregate statistics and tier occupancy
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
