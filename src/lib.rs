//! Server-rendered card view of the posts published by a WordPress REST API.
//!
//! The post list is fetched once at startup and shown as one card per post,
//! with a toggle between each post's excerpt and its full content.

pub mod compat;
pub mod config;
pub mod fetch;
pub mod model;
pub mod page;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
