use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{ServerError, catalog, communities, emissions, expenses};
use engine::{Ctx, Engine, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the caller's role in a community and builds the engine [`Ctx`].
///
/// Non-members get `NotFound` rather than `Forbidden` so they cannot probe
/// which community ids exist.
pub(crate) async fn ctx_for(
    state: &ServerState,
    community_id: &str,
    username: &str,
) -> Result<Ctx, ServerError> {
    let role = state.engine.member_role(community_id, username).await?;
    Ok(Ctx::new(username, community_id, role))
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<users::Model> = users::Entity::find()
        .filter(users::Column::Username.eq(auth_header.username()))
        .filter(users::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/communities",
            post(communities::create).get(communities::list),
        )
        .route(
            "/communities/{community_id}/members",
            get(communities::list_members).post(communities::upsert_member),
        )
        .route(
            "/communities/{community_id}/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/communities/{community_id}/cost_centers",
            post(catalog::create_cost_center),
        )
        .route(
            "/communities/{community_id}/providers",
            post(catalog::create_provider),
        )
        .route(
            "/communities/{community_id}/purchase_documents",
            post(catalog::create_purchase_document),
        )
        .route(
            "/communities/{community_id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}",
            get(expenses::get)
                .patch(expenses::update)
                .delete(expenses::delete),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}/submit",
            post(expenses::submit),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}/decision",
            post(expenses::record_decision),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}/approvals",
            get(expenses::list_approvals),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}/pay",
            post(expenses::pay),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}/annul",
            post(expenses::annul),
        )
        .route(
            "/communities/{community_id}/expenses/{expense_id}/history",
            get(expenses::history),
        )
        .route(
            "/communities/{community_id}/emissions",
            get(emissions::list).post(emissions::create),
        )
        .route(
            "/communities/{community_id}/emissions/{emission_id}/expenses",
            post(emissions::attach_expense),
        )
        .route(
            "/communities/{community_id}/emissions/{emission_id}/close",
            post(emissions::close),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
