//! API routes definition

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Board routes
        .route("/boards", post(handlers::create_board))
        .route("/boards/shared", get(handlers::list_shared_boards))
        .route("/boards/:id", get(handlers::get_board))
        .route("/boards/:id/visibility", put(handlers::set_visibility))
        .route("/boards/:id/settings", put(handlers::update_settings))
        .route("/boards/:id/access", get(handlers::get_access))
        // Member routes
        .route(
            "/boards/:id/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        .route("/boards/:id/members/:user_id", delete(handlers::remove_member))
        .route("/boards/:id/members/:user_id/role", put(handlers::update_member_role))
        .route("/boards/:id/leave", post(handlers::leave_board))
        // Invite routes
        .route(
            "/boards/:id/invites",
            get(handlers::list_invite_links).post(handlers::create_invite_link),
        )
        .route("/boards/:id/invites/:link_id", delete(handlers::revoke_invite_link))
        .route("/invites/accept", post(handlers::accept_invite_link))
        // Profile routes
        .route("/users/me", put(handlers::update_profile))
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn_with_state(request_timeout, enforce_timeout))
        .with_state(state)
}

async fn enforce_timeout(State(timeout): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::Timeout.into_response(),
    }
}
