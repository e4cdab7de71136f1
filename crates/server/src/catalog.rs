//! Catalog endpoints: categories, cost centers, providers and purchase
//! documents.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::catalog::{
    CategoryNew, CategoryView, CostCenterNew, Created, ProviderNew, PurchaseDocumentNew,
};

use crate::{ServerError, server::ServerState, server::ctx_for};
use engine::users;

pub async fn create_category(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let id = state.engine.create_category(&ctx, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list_categories(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let categories = state
        .engine
        .list_categories(&ctx)
        .await?
        .into_iter()
        .map(|model| {
            let id = Uuid::parse_str(&model.id)
                .map_err(|err| ServerError::Generic(err.to_string()))?;
            Ok(CategoryView {
                id,
                name: model.name,
            })
        })
        .collect::<Result<_, ServerError>>()?;

    Ok(Json(categories))
}

pub async fn create_cost_center(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<CostCenterNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let id = state
        .engine
        .create_cost_center(&ctx, &payload.name, &payload.code)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn create_provider(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<ProviderNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let id = state
        .engine
        .create_provider(&ctx, &payload.name, payload.tax_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn create_purchase_document(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<PurchaseDocumentNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let id = state
        .engine
        .create_purchase_document(
            &ctx,
            payload.provider_id,
            &payload.doc_type,
            &payload.folio,
            payload.issued_at,
            payload.total_minor,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}
