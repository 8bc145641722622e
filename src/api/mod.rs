//! API Module
//!
//! HTTP handlers and routing for the cache lab REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /cache/fetch/:key` - Fetch through the cache
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/clear` - Drop every entry
//! - `POST /cache/policy` - Switch eviction policy
//! - `POST /cache/reindex` - Rebuild eviction scores
//! - `POST /cache/reset-stats` - Zero the counters
//! - `POST /traffic/start` - Start a load run
//! - `POST /traffic/stop` - Stop the active run
//! - `GET /traffic/stats` - Run progress
//! - `GET /traffic/patterns` - Preset run configurations
//! - `POST /traffic/test-request` - Send a single request

pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::OptionalJson;
pub use handlers::*;
pub use routes::create_router;
