//! Emission endpoints: create, attach approved expenses, close.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::catalog::Created;
use api_types::emission::{EmissionItemNew, EmissionNew, EmissionView, EmissionsResponse};

use crate::{ServerError, server::ServerState, server::ctx_for};
use engine::users;

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<EmissionNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let id = state.engine.create_emission(&ctx, &payload.period).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
) -> Result<Json<EmissionsResponse>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let emissions = state
        .engine
        .list_emissions(&ctx)
        .await?
        .into_iter()
        .map(|model| {
            let id = Uuid::parse_str(&model.id)
                .map_err(|err| ServerError::Generic(err.to_string()))?;
            Ok(EmissionView {
                id,
                period: model.period,
                status: model.status,
                closed_at: model.closed_at,
            })
        })
        .collect::<Result<_, ServerError>>()?;

    Ok(Json(EmissionsResponse { emissions }))
}

pub async fn attach_expense(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, emission_id)): Path<(String, Uuid)>,
    Json(payload): Json<EmissionItemNew>,
) -> Result<StatusCode, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    state
        .engine
        .attach_expense_to_emission(&ctx, emission_id, payload.expense_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn close(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, emission_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    state.engine.close_emission(&ctx, emission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
