use super::admin_only;
use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Post Router
///
/// Reads and delete are open to everyone. Create and update sit behind the identity
/// and admin-role gates.
pub fn post_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // GET /?search=...&category=...&location=...
        .route("/", get(handlers::list_posts))
        // POST /create-post
        .route("/create-post", admin_only(state, post(handlers::create_post)))
        // GET /related/{id}
        .route("/related/{id}", get(handlers::related_posts))
        // GET/DELETE /{id}
        .route(
            "/{id}",
            get(handlers::get_post).delete(handlers::delete_post),
        )
        // PUT /{id}
        .route("/{id}", admin_only(state, put(handlers::update_post)))
}
