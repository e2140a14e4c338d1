//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Invalidate a key in both tiers
//! - `DELETE /tag/:tag` - Bulk-invalidate entries by tag
//! - `POST /clear` - Empty both tiers and reset stats
//! - `POST /vacuum` - Run a sweep immediately
//! - `POST /warmup` - Preload supplied entries
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
