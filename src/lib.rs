//! Storyhouse - backend for a serialized-fiction publishing platform
//!
//! Users register and log in, authors publish works composed of numbered
//! episodes, readers comment and engage (views, likes), and authors manage
//! a personal dashboard.
//!
//! ## Services
//!
//! - **Identity**: registration, login, bearer-token sessions
//! - **Content**: work CRUD with ownership checks, episode numbering
//! - **Engagement**: monotonic view/like counters plus per-user events
//! - **Aggregation**: work detail and dashboard composites
//! - **Uploads**: image storage with extension allow-listing

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod server;
pub mod uploads;
pub mod views;

pub use config::Args;
pub use error::{ApiError, Result};
pub use server::{create_router, run, AppState, SharedState};
