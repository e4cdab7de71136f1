use chrono::{Datelike, Utc};
use sea_orm::{ActiveModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::{CreateExpenseCmd, Ctx, Expense, ExpenseStatus, ResultEngine, expenses};

use super::super::super::{
    Engine, normalize_required_text, require_write_role, validate_amount, with_tx,
};

impl Engine {
    /// Creates a new expense in `draft`, assigning the next correlative
    /// number for the community.
    pub async fn create_expense(
        &self,
        ctx: &Ctx,
        cmd: CreateExpenseCmd,
    ) -> ResultEngine<Expense> {
        require_write_role(ctx)?;
        let amount_minor = validate_amount(cmd.amount_minor)?;
        let glosa = normalize_required_text(&cmd.glosa, "glosa", 3, 500)?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            self.require_category_in_community(&db_tx, &ctx.community_id, cmd.category_id)
                .await?;
            if let Some(cost_center_id) = cmd.cost_center_id {
                self.require_cost_center_in_community(&db_tx, &ctx.community_id, cost_center_id)
                    .await?;
            }
            if let Some(provider_id) = cmd.provider_id {
                self.require_provider_in_community(&db_tx, &ctx.community_id, provider_id)
                    .await?;
            }
            if let Some(document_id) = cmd.purchase_document_id {
                self.require_purchase_document_in_community(&db_tx, &ctx.community_id, document_id)
                    .await?;
            }

            let numero = self
                .next_correlative(&db_tx, &ctx.community_id, cmd.fecha.year())
                .await?;
            let now = Utc::now();

            let expense = Expense {
                id: Uuid::new_v4(),
                community_id: ctx.community_id.clone(),
                numero,
                category_id: cmd.category_id,
                cost_center_id: cmd.cost_center_id,
                provider_id: cmd.provider_id,
                purchase_document_id: cmd.purchase_document_id,
                fecha: cmd.fecha,
                amount_minor,
                glosa: glosa.clone(),
                extraordinary: cmd.extraordinary,
                status: ExpenseStatus::Draft,
                created_by: ctx.user_id.clone(),
                approved_by: None,
                annul_reason: None,
                version: 1,
                created_at: now,
                updated_at: now,
            };

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            Ok(expense)
        })
    }
}
