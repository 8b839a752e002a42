use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Comment Router
///
/// Both routes are public.
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/postComment", post(handlers::create_comment))
        .route("/totalComments", get(handlers::count_comments))
}
