//! Application state, router and server loop

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::Args;
use crate::db::Database;
use crate::error::Result;
use crate::routes::{auth_routes, episodes, upload, users, works};
use crate::uploads::ImageStore;

/// Shared application state, constructed once at startup and passed into
/// every handler. Store and token-verification dependencies live here
/// rather than in process-wide globals.
pub struct AppState {
    pub args: Args,
    pub db: Database,
    pub tokens: TokenIssuer,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(args: Args, db: Database, images: ImageStore) -> Self {
        let tokens = TokenIssuer::new(&args.jwt_secret(), args.jwt_expiry_seconds);
        Self {
            args,
            db,
            tokens,
            images,
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // Identity
        .route("/check-username", post(auth_routes::check_username))
        .route("/register", post(auth_routes::register))
        .route("/login", post(auth_routes::login))
        // Works
        .route("/notes", get(works::list_works).post(works::create_work))
        .route(
            "/notes/:id",
            get(works::work_detail)
                .put(works::update_work)
                .delete(works::delete_work),
        )
        .route("/notes/:id/like", post(works::like_work))
        .route("/best9", get(works::best9))
        .route("/author/:name/works", get(works::works_by_author))
        // Episodes
        .route("/api/episode", post(episodes::add_episode))
        // Acting user
        .route(
            "/users/me",
            get(users::get_dashboard).patch(users::update_profile),
        )
        // Uploads
        .route("/upload", post(upload::upload_image))
        .route("/uploads/:filename", get(upload::serve_image))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server until it exits
pub async fn run(state: SharedState) -> Result<()> {
    let listen = state.args.listen;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("Listening on {}", listen);

    axum::serve(listener, app).await?;

    Ok(())
}
