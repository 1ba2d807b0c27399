//! HTTP server layer for the photomosaic service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │             GET /      POST /upload      GET /health            │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    page     │  │        routes           │  │
//! │  │ (requests)  │  │ (upload UI) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod page;
pub mod routes;

pub use handlers::{
    health_handler, index_handler, parse_cell_size, tile_stats_handler, upload_handler, AppState,
    ErrorResponse, HandlerError, HealthResponse, TileStatsResponse,
};
pub use routes::{create_router, RouterConfig};
