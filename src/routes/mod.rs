//! Router modules, one per mounted resource. Gated routes wrap their method router
//! with [`admin_only`], so the gates run only for the methods that need them.

use crate::{
    AppState,
    auth::{require_admin, require_identity},
};
use axum::{middleware, routing::MethodRouter};

/// Routes mounted under `/api/posts`.
pub mod posts;

/// Routes mounted under `/api/comments`.
pub mod comments;

/// Puts the identity gate and then the role gate in front of `method_router`.
/// Layers added later run first, so identity is checked before role.
pub fn admin_only(state: &AppState, method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_identity))
}
