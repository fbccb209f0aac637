//! API Module
//!
//! HTTP handlers and routing for the cache monitor: stats for the
//! dashboard's system-monitor view plus basic administration of each cache.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
