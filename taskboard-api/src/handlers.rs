//! HTTP handlers
//!
//! Each handler forwards the caller id to the board service, which does all
//! authorization itself.

use crate::error::ApiResult;
use crate::extract::Caller;
use crate::state::AppState;
use crate::types::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use taskboard_core::core_board::{
    AcceptedInvite, AccessResult, Board, BoardId, BoardSettings, InviteLink, LinkId, Member, MemberView,
    NewBoard, UserId, UserProfile,
};

type AppStateRef = State<Arc<AppState>>;

// ============================================================================
// Board Handlers
// ============================================================================

/// POST /boards
pub async fn create_board(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Json(req): Json<NewBoard>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let board = state.boards.create_board(req, caller).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /boards/shared - boards the caller owns or belongs to
pub async fn list_shared_boards(State(state): AppStateRef, Caller(caller): Caller) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.boards.list_shared_boards(caller).await?))
}

/// GET /boards/:id
pub async fn get_board(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
) -> ApiResult<Json<Board>> {
    Ok(Json(state.boards.get_board(BoardId::new(board_id), caller).await?))
}

/// PUT /boards/:id/visibility
pub async fn set_visibility(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
    Json(req): Json<VisibilityRequest>,
) -> ApiResult<Json<Board>> {
    let board = state
        .boards
        .set_visibility(BoardId::new(board_id), req.is_public, caller)
        .await?;
    Ok(Json(board))
}

/// PUT /boards/:id/settings
pub async fn update_settings(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
    Json(req): Json<BoardSettings>,
) -> ApiResult<Json<BoardSettings>> {
    let settings = state
        .boards
        .update_settings(BoardId::new(board_id), req, caller)
        .await?;
    Ok(Json(settings))
}

/// GET /boards/:id/access - the caller's own role and permissions
pub async fn get_access(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
) -> ApiResult<Json<AccessResult>> {
    Ok(Json(state.boards.get_access(BoardId::new(board_id), caller).await?))
}

// ============================================================================
// Member Handlers
// ============================================================================

/// GET /boards/:id/members
pub async fn list_members(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
) -> ApiResult<Json<Vec<MemberView>>> {
    Ok(Json(state.boards.list_members(BoardId::new(board_id), caller).await?))
}

/// POST /boards/:id/members
pub async fn add_member(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<Member>> {
    let member = state
        .boards
        .add_member(BoardId::new(board_id), req.user_id, req.role, caller)
        .await?;
    Ok(Json(member))
}

/// DELETE /boards/:id/members/:user_id
pub async fn remove_member(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path((board_id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .boards
        .remove_member(BoardId::new(board_id), UserId::new(user_id), caller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /boards/:id/members/:user_id/role
pub async fn update_member_role(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path((board_id, user_id)): Path<(String, String)>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<Member>> {
    let member = state
        .boards
        .update_member_role(BoardId::new(board_id), UserId::new(user_id), req.role, caller)
        .await?;
    Ok(Json(member))
}

/// POST /boards/:id/leave
pub async fn leave_board(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.boards.leave_board(BoardId::new(board_id), caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Invite Handlers
// ============================================================================

/// GET /boards/:id/invites
pub async fn list_invite_links(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
) -> ApiResult<Json<Vec<InviteLink>>> {
    Ok(Json(state.boards.list_invite_links(BoardId::new(board_id), caller).await?))
}

/// POST /boards/:id/invites
pub async fn create_invite_link(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path(board_id): Path<String>,
    Json(req): Json<CreateInviteRequest>,
) -> ApiResult<(StatusCode, Json<InviteLink>)> {
    let link = state
        .boards
        .create_invite_link(BoardId::new(board_id), req.role, caller, req.options)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /boards/:id/invites/:link_id
pub async fn revoke_invite_link(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Path((board_id, link_id)): Path<(String, String)>,
) -> ApiResult<Json<InviteLink>> {
    let link = state
        .boards
        .revoke_invite_link(BoardId::new(board_id), LinkId::new(link_id), caller)
        .await?;
    Ok(Json(link))
}

/// POST /invites/accept
pub async fn accept_invite_link(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Json(req): Json<AcceptInviteRequest>,
) -> ApiResult<Json<AcceptedInvite>> {
    Ok(Json(state.boards.accept_invite_link(req.token, caller).await?))
}

// ============================================================================
// Profile Handlers
// ============================================================================

/// PUT /users/me - publish the caller's profile for member listings
pub async fn update_profile(
    State(state): AppStateRef,
    Caller(caller): Caller,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserProfile {
        user_id: caller,
        display_name: req.display_name,
        email: req.email,
        avatar_url: req.avatar_url,
    };
    state.directory.upsert(profile.clone());
    Ok(Json(profile))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
