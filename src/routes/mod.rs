//! HTTP routes for Storyhouse

pub mod auth_routes;
pub mod episodes;
pub mod upload;
pub mod users;
pub mod works;
