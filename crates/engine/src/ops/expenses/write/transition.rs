use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Ctx, EngineError, Expense, ExpenseStatus, ResultEngine, expenses};

use super::super::super::{Engine, require_write_role, with_tx};
use super::super::history_value;

impl Engine {
    /// Submits a draft expense for approval (`draft → pending`).
    pub async fn submit_expense(&self, ctx: &Ctx, expense_id: Uuid) -> ResultEngine<Expense> {
        self.transition_expense(ctx, expense_id, ExpenseStatus::Pending, "submit")
            .await
    }

    /// Marks an approved expense as paid (`approved → paid`).
    pub async fn mark_expense_paid(&self, ctx: &Ctx, expense_id: Uuid) -> ResultEngine<Expense> {
        self.transition_expense(ctx, expense_id, ExpenseStatus::Paid, "pay")
            .await
    }

    /// Deletes a `draft` expense. Anything past draft is kept for audit.
    pub async fn delete_expense(&self, ctx: &Ctx, expense_id: Uuid) -> ResultEngine<()> {
        require_write_role(ctx)?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let expense = self.require_expense(&db_tx, ctx, expense_id).await?;

            if !expense.status.is_deletable() {
                return Err(EngineError::InvalidState(format!(
                    "expense in status {} cannot be deleted",
                    expense.status.as_str()
                )));
            }

            expenses::Entity::delete_by_id(expense.id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Moves an expense along the lifecycle graph, recording the status
    /// change in history.
    async fn transition_expense(
        &self,
        ctx: &Ctx,
        expense_id: Uuid,
        next: ExpenseStatus,
        verb: &str,
    ) -> ResultEngine<Expense> {
        require_write_role(ctx)?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let mut expense = self.require_expense(&db_tx, ctx, expense_id).await?;

            if !expense.status.can_transition_to(next) {
                return Err(EngineError::InvalidState(format!(
                    "cannot {verb} expense in status {}",
                    expense.status.as_str()
                )));
            }

            self.record_history(
                &db_tx,
                expense.id,
                "status",
                history_value(expense.status.as_str()),
                history_value(next.as_str()),
                &ctx.user_id,
            )
            .await?;

            let expected_version = expense.version;
            expense.status = next;
            expense.version += 1;
            expense.updated_at = Utc::now();

            let patch = expenses::ActiveModel {
                status: ActiveValue::Set(next.as_str().to_string()),
                version: ActiveValue::Set(expense.version),
                updated_at: ActiveValue::Set(expense.updated_at),
                ..Default::default()
            };
            self.apply_versioned_update(&db_tx, expense.id, expected_version, patch)
                .await?;
            Ok(expense)
        })
    }
}
