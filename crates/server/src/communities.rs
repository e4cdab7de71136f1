//! Community and membership endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::community::{CommunitiesResponse, CommunityNew, CommunityView};
use api_types::membership::{MemberRole, MemberUpsert, MemberView, MembersResponse};

use crate::{ServerError, server::ServerState, server::ctx_for};
use engine::users;

fn role_view(role: engine::MemberRole) -> MemberRole {
    match role {
        engine::MemberRole::Admin => MemberRole::Admin,
        engine::MemberRole::Manager => MemberRole::Manager,
        engine::MemberRole::Resident => MemberRole::Resident,
    }
}

fn role_from_view(role: MemberRole) -> engine::MemberRole {
    match role {
        MemberRole::Admin => engine::MemberRole::Admin,
        MemberRole::Manager => engine::MemberRole::Manager,
        MemberRole::Resident => engine::MemberRole::Resident,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CommunityNew>,
) -> Result<(StatusCode, Json<String>), ServerError> {
    let id = state
        .engine
        .create_community(&user.username, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(id)))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CommunitiesResponse>, ServerError> {
    let communities = state
        .engine
        .communities_for(&user.username)
        .await?
        .into_iter()
        .map(|(community, role)| CommunityView {
            id: community.id,
            name: community.name,
            role: role_view(role),
        })
        .collect();

    Ok(Json(CommunitiesResponse { communities }))
}

pub async fn list_members(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
) -> Result<Json<MembersResponse>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let members = state
        .engine
        .list_members(&ctx)
        .await?
        .into_iter()
        .map(|(username, role)| MemberView {
            username,
            role: role_view(role),
        })
        .collect();

    Ok(Json(MembersResponse { members }))
}

pub async fn upsert_member(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<MemberUpsert>,
) -> Result<StatusCode, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    state
        .engine
        .upsert_member(&ctx, &payload.username, role_from_view(payload.role))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
