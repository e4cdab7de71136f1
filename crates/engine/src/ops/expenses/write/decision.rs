use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ApprovalDecision, Ctx, DecisionCmd, EngineError, Expense, ExpenseStatus, ResultEngine,
    approvals, expenses,
};

use super::super::super::{
    Engine, normalize_optional_text, require_approve_role, validate_amount, with_tx,
};
use super::super::history_value;

impl Engine {
    /// Records one reviewer decision on a pending expense and applies the
    /// aggregate outcome against the injected policy.
    ///
    /// Reject-dominant communities reject on the first `rechazado`; in
    /// any configuration an expense never reaches `approved` while an
    /// unresolved rejection exists.
    pub async fn record_decision(&self, ctx: &Ctx, cmd: DecisionCmd) -> ResultEngine<Expense> {
        require_approve_role(ctx)?;
        let observations = normalize_optional_text(cmd.observations.as_deref());
        let approved_amount_minor = cmd
            .approved_amount_minor
            .map(validate_amount)
            .transpose()?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let mut expense = self.require_expense(&db_tx, ctx, cmd.expense_id).await?;

            if expense.status != ExpenseStatus::Pending {
                return Err(EngineError::InvalidState(format!(
                    "cannot record a decision in status {}",
                    expense.status.as_str()
                )));
            }

            let row = approvals::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                expense_id: ActiveValue::Set(expense.id.to_string()),
                decision: ActiveValue::Set(cmd.decision.as_str().to_string()),
                observations: ActiveValue::Set(observations.clone()),
                approved_amount_minor: ActiveValue::Set(approved_amount_minor),
                decided_by: ActiveValue::Set(ctx.user_id.clone()),
                decided_at: ActiveValue::Set(Utc::now()),
            };
            row.insert(&db_tx).await?;

            let recorded = approvals::Entity::find()
                .filter(approvals::Column::ExpenseId.eq(expense.id.to_string()))
                .all(&db_tx)
                .await?;
            let rejections = recorded
                .iter()
                .filter(|a| a.decision == ApprovalDecision::Rechazado.as_str())
                .count();
            let approvals_count = recorded
                .iter()
                .filter(|a| a.decision == ApprovalDecision::Aprobado.as_str())
                .count();

            // A pending rejection always blocks approval; whether it is
            // immediately terminal depends on the policy.
            let policy = self.policy();
            let next = if rejections > 0 {
                policy.reject_dominant.then_some(ExpenseStatus::Rejected)
            } else if approvals_count as u32 >= policy.required_approvals {
                Some(ExpenseStatus::Approved)
            } else {
                None
            };

            let expected_version = expense.version;
            expense.version += 1;
            expense.updated_at = Utc::now();
            let mut patch = expenses::ActiveModel {
                version: ActiveValue::Set(expense.version),
                updated_at: ActiveValue::Set(expense.updated_at),
                ..Default::default()
            };

            if let Some(next) = next {
                if !expense.status.can_transition_to(next) {
                    return Err(EngineError::InvalidState(format!(
                        "cannot move expense from {} to {}",
                        expense.status.as_str(),
                        next.as_str()
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

                patch.status = ActiveValue::Set(next.as_str().to_string());
                expense.status = next;
                if next == ExpenseStatus::Approved {
                    patch.approved_by = ActiveValue::Set(Some(ctx.user_id.clone()));
                    expense.approved_by = Some(ctx.user_id.clone());
                }
            }

            // The version bumps even when the status stays pending, so
            // concurrent decisions on the same expense serialize.
            self.apply_versioned_update(&db_tx, expense.id, expected_version, patch)
                .await?;
            Ok(expense)
        })
    }
}
