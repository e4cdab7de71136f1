use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait};

use crate::{AnnulExpenseCmd, Ctx, EngineError, Expense, ExpenseStatus, ResultEngine, expenses};

use super::super::super::{Engine, normalize_required_text, require_write_role, with_tx};
use super::super::history_value;

impl Engine {
    /// Annuls an approved expense (`approved → annulled`).
    ///
    /// An expense apportioned in a closed billing emission is immutable:
    /// the guard fires before any state check and reports `Conflict`.
    pub async fn annul_expense(&self, ctx: &Ctx, cmd: AnnulExpenseCmd) -> ResultEngine<Expense> {
        require_write_role(ctx)?;
        let reason = normalize_required_text(&cmd.reason, "annulment reason", 1, 500)?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let mut expense = self.require_expense(&db_tx, ctx, cmd.expense_id).await?;

            if self
                .expense_in_closed_emission(&db_tx, expense.id)
                .await?
            {
                return Err(EngineError::Conflict(
                    "included in closed emission".to_string(),
                ));
            }

            if !expense.status.can_transition_to(ExpenseStatus::Annulled) {
                return Err(EngineError::InvalidState(format!(
                    "cannot annul expense in status {}",
                    expense.status.as_str()
                )));
            }

            self.record_history(
                &db_tx,
                expense.id,
                "status",
                history_value(expense.status.as_str()),
                history_value(ExpenseStatus::Annulled.as_str()),
                &ctx.user_id,
            )
            .await?;

            let expected_version = expense.version;
            expense.status = ExpenseStatus::Annulled;
            expense.annul_reason = Some(reason.clone());
            expense.version += 1;
            expense.updated_at = Utc::now();

            let patch = expenses::ActiveModel {
                status: ActiveValue::Set(ExpenseStatus::Annulled.as_str().to_string()),
                annul_reason: ActiveValue::Set(Some(reason.clone())),
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
