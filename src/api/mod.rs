//! API Module
//!
//! HTTP handlers and routing for the cache service.
//!
//! # Endpoints
//! - `PUT /cache/:category/:key` - Cache a value under a category
//! - `GET /cache/:category/:key` - Retrieve a live value
//! - `DELETE /cache/:key` - Remove a key
//! - `GET /stats` - Cache statistics
//! - `GET /metrics` - Performance report
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
