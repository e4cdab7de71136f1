//! Expense lifecycle endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::approval::{ApprovalView, ApprovalsResponse, DecisionNew};
use api_types::expense::{
    AnnulNew, ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseUpdate, ExpenseView,
};
use api_types::history::{HistoryResponse, HistoryView};

use crate::{ServerError, server::ServerState, server::ctx_for};
use engine::{
    AnnulExpenseCmd, CreateExpenseCmd, DecisionCmd, Expense, ExpenseListFilter, UpdateExpenseCmd,
    users,
};

fn status_view(status: engine::ExpenseStatus) -> api_types::expense::ExpenseStatus {
    use api_types::expense::ExpenseStatus as View;
    match status {
        engine::ExpenseStatus::Draft => View::Draft,
        engine::ExpenseStatus::Pending => View::Pending,
        engine::ExpenseStatus::Approved => View::Approved,
        engine::ExpenseStatus::Rejected => View::Rejected,
        engine::ExpenseStatus::Paid => View::Paid,
        engine::ExpenseStatus::Annulled => View::Annulled,
    }
}

fn status_from_view(status: api_types::expense::ExpenseStatus) -> engine::ExpenseStatus {
    use api_types::expense::ExpenseStatus as View;
    match status {
        View::Draft => engine::ExpenseStatus::Draft,
        View::Pending => engine::ExpenseStatus::Pending,
        View::Approved => engine::ExpenseStatus::Approved,
        View::Rejected => engine::ExpenseStatus::Rejected,
        View::Paid => engine::ExpenseStatus::Paid,
        View::Annulled => engine::ExpenseStatus::Annulled,
    }
}

fn decision_from_view(
    decision: api_types::approval::ApprovalDecision,
) -> engine::ApprovalDecision {
    match decision {
        api_types::approval::ApprovalDecision::Aprobado => engine::ApprovalDecision::Aprobado,
        api_types::approval::ApprovalDecision::Rechazado => engine::ApprovalDecision::Rechazado,
    }
}

fn decision_view(decision: engine::ApprovalDecision) -> api_types::approval::ApprovalDecision {
    match decision {
        engine::ApprovalDecision::Aprobado => api_types::approval::ApprovalDecision::Aprobado,
        engine::ApprovalDecision::Rechazado => api_types::approval::ApprovalDecision::Rechazado,
    }
}

fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        numero: expense.numero,
        category_id: expense.category_id,
        cost_center_id: expense.cost_center_id,
        provider_id: expense.provider_id,
        purchase_document_id: expense.purchase_document_id,
        fecha: expense.fecha,
        amount_minor: expense.amount_minor,
        glosa: expense.glosa,
        extraordinary: expense.extraordinary,
        status: status_view(expense.status),
        created_by: expense.created_by,
        approved_by: expense.approved_by,
        annul_reason: expense.annul_reason,
        version: expense.version,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;

    let mut cmd = CreateExpenseCmd::new(
        payload.category_id,
        payload.fecha,
        payload.amount_minor,
        payload.glosa,
    );
    if let Some(id) = payload.cost_center_id {
        cmd = cmd.cost_center_id(id);
    }
    if let Some(id) = payload.provider_id {
        cmd = cmd.provider_id(id);
    }
    if let Some(id) = payload.purchase_document_id {
        cmd = cmd.purchase_document_id(id);
    }
    if let Some(extraordinary) = payload.extraordinary {
        cmd = cmd.extraordinary(extraordinary);
    }

    let expense = state.engine.create_expense(&ctx, cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let expense = state.engine.expense(&ctx, expense_id).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(community_id): Path<String>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;

    let defaults = ExpenseListFilter::default();
    let filter = ExpenseListFilter {
        status: query.status.map(status_from_view),
        category_id: query.category_id,
        extraordinary: query.extraordinary,
        from: query.fecha_from,
        to: query.fecha_to,
        limit: query.limit.unwrap_or(defaults.limit),
        offset: query.offset.unwrap_or(defaults.offset),
    };

    let expenses = state
        .engine
        .list_expenses(&ctx, &filter)
        .await?
        .into_iter()
        .map(expense_view)
        .collect();

    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;

    let cmd = UpdateExpenseCmd {
        expense_id,
        category_id: payload.category_id,
        cost_center_id: payload.cost_center_id,
        provider_id: payload.provider_id,
        purchase_document_id: payload.purchase_document_id,
        fecha: payload.fecha,
        amount_minor: payload.amount_minor,
        glosa: payload.glosa,
        extraordinary: payload.extraordinary,
    };

    let expense = state.engine.update_expense(&ctx, cmd).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    state.engine.delete_expense(&ctx, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let expense = state.engine.submit_expense(&ctx, expense_id).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn record_decision(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
    Json(payload): Json<DecisionNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;

    let mut cmd = DecisionCmd::new(expense_id, decision_from_view(payload.decision));
    if let Some(observations) = payload.observations {
        cmd = cmd.observations(observations);
    }
    if let Some(amount) = payload.approved_amount_minor {
        cmd = cmd.approved_amount_minor(amount);
    }

    let expense = state.engine.record_decision(&ctx, cmd).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn list_approvals(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
) -> Result<Json<ApprovalsResponse>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let approvals = state
        .engine
        .expense_approvals(&ctx, expense_id)
        .await?
        .into_iter()
        .map(|approval| ApprovalView {
            id: approval.id,
            decision: decision_view(approval.decision),
            observations: approval.observations,
            approved_amount_minor: approval.approved_amount_minor,
            decided_by: approval.decided_by,
            decided_at: approval.decided_at,
        })
        .collect();

    Ok(Json(ApprovalsResponse { approvals }))
}

pub async fn pay(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let expense = state.engine.mark_expense_paid(&ctx, expense_id).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn annul(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
    Json(payload): Json<AnnulNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let expense = state
        .engine
        .annul_expense(&ctx, AnnulExpenseCmd::new(expense_id, payload.reason))
        .await?;
    Ok(Json(expense_view(expense)))
}

pub async fn history(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((community_id, expense_id)): Path<(String, Uuid)>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let ctx = ctx_for(&state, &community_id, &user.username).await?;
    let entries = state
        .engine
        .expense_history(&ctx, expense_id)
        .await?
        .into_iter()
        .map(|entry| HistoryView {
            id: entry.id,
            field: entry.field,
            old_value: entry.old_value,
            new_value: entry.new_value,
            changed_by: entry.changed_by,
            changed_at: entry.changed_at,
        })
        .collect();

    Ok(Json(HistoryResponse { entries }))
}
