use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait};

use crate::{Ctx, EngineError, Expense, ResultEngine, UpdateExpenseCmd, expenses};

use super::super::super::{
    Engine, normalize_required_text, require_write_role, validate_amount, with_tx,
};
use super::super::{history_opt_uuid, history_value};

impl Engine {
    /// Patches an editable (`draft` or `pending`) expense.
    ///
    /// Every actually-changed field appends exactly one history row with
    /// the stored old value; a no-op patch writes nothing.
    pub async fn update_expense(
        &self,
        ctx: &Ctx,
        cmd: UpdateExpenseCmd,
    ) -> ResultEngine<Expense> {
        require_write_role(ctx)?;
        let amount_minor = cmd.amount_minor.map(validate_amount).transpose()?;
        let glosa = cmd
            .glosa
            .as_deref()
            .map(|g| normalize_required_text(g, "glosa", 3, 500))
            .transpose()?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let mut expense = self.require_expense(&db_tx, ctx, cmd.expense_id).await?;

            if !expense.status.is_editable() {
                return Err(EngineError::InvalidState(format!(
                    "expense in status {} is not editable",
                    expense.status.as_str()
                )));
            }

            let mut changes: Vec<(&str, Option<String>, Option<String>)> = Vec::new();
            let mut patch = expenses::ActiveModel::default();

            if let Some(category_id) = cmd.category_id
                && category_id != expense.category_id
            {
                self.require_category_in_community(&db_tx, &ctx.community_id, category_id)
                    .await?;
                changes.push((
                    "category_id",
                    history_value(expense.category_id),
                    history_value(category_id),
                ));
                patch.category_id = ActiveValue::Set(category_id.to_string());
                expense.category_id = category_id;
            }

            if let Some(cost_center_id) = cmd.cost_center_id
                && Some(cost_center_id) != expense.cost_center_id
            {
                self.require_cost_center_in_community(&db_tx, &ctx.community_id, cost_center_id)
                    .await?;
                changes.push((
                    "cost_center_id",
                    history_opt_uuid(expense.cost_center_id),
                    history_value(cost_center_id),
                ));
                patch.cost_center_id = ActiveValue::Set(Some(cost_center_id.to_string()));
                expense.cost_center_id = Some(cost_center_id);
            }

            if let Some(provider_id) = cmd.provider_id
                && Some(provider_id) != expense.provider_id
            {
                self.require_provider_in_community(&db_tx, &ctx.community_id, provider_id)
                    .await?;
                changes.push((
                    "provider_id",
                    history_opt_uuid(expense.provider_id),
                    history_value(provider_id),
                ));
                patch.provider_id = ActiveValue::Set(Some(provider_id.to_string()));
                expense.provider_id = Some(provider_id);
            }

            if let Some(document_id) = cmd.purchase_document_id
                && Some(document_id) != expense.purchase_document_id
            {
                self.require_purchase_document_in_community(&db_tx, &ctx.community_id, document_id)
                    .await?;
                changes.push((
                    "purchase_document_id",
                    history_opt_uuid(expense.purchase_document_id),
                    history_value(document_id),
                ));
                patch.purchase_document_id = ActiveValue::Set(Some(document_id.to_string()));
                expense.purchase_document_id = Some(document_id);
            }

            if let Some(fecha) = cmd.fecha
                && fecha != expense.fecha
            {
                changes.push(("fecha", history_value(expense.fecha), history_value(fecha)));
                patch.fecha = ActiveValue::Set(fecha);
                expense.fecha = fecha;
            }

            if let Some(amount_minor) = amount_minor
                && amount_minor != expense.amount_minor
            {
                changes.push((
                    "amount_minor",
                    history_value(expense.amount_minor),
                    history_value(amount_minor),
                ));
                patch.amount_minor = ActiveValue::Set(amount_minor);
                expense.amount_minor = amount_minor;
            }

            if let Some(glosa) = glosa.clone()
                && glosa != expense.glosa
            {
                changes.push((
                    "glosa",
                    history_value(expense.glosa.clone()),
                    history_value(glosa.clone()),
                ));
                patch.glosa = ActiveValue::Set(glosa.clone());
                expense.glosa = glosa;
            }

            if let Some(extraordinary) = cmd.extraordinary
                && extraordinary != expense.extraordinary
            {
                changes.push((
                    "extraordinary",
                    history_value(expense.extraordinary),
                    history_value(extraordinary),
                ));
                patch.extraordinary = ActiveValue::Set(extraordinary);
                expense.extraordinary = extraordinary;
            }

            if changes.is_empty() {
                return Ok(expense);
            }

            for (field, old_value, new_value) in changes {
                self.record_history(&db_tx, expense.id, field, old_value, new_value, &ctx.user_id)
                    .await?;
            }

            let expected_version = expense.version;
            expense.version += 1;
            expense.updated_at = Utc::now();
            patch.version = ActiveValue::Set(expense.version);
            patch.updated_at = ActiveValue::Set(expense.updated_at);

            self.apply_versioned_update(&db_tx, expense.id, expected_version, patch)
                .await?;
            Ok(expense)
        })
    }
}
