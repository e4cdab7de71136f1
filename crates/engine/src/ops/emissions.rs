//! Emission operations: the minimum surface for the closed-emission
//! guard. Distribution math lives elsewhere and is out of scope.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Ctx, EmissionStatus, EngineError, ExpenseStatus, ResultEngine, emission_items, emissions,
};

use super::{Engine, normalize_required_text, require_write_role, with_tx};

impl Engine {
    pub async fn create_emission(&self, ctx: &Ctx, period: &str) -> ResultEngine<Uuid> {
        require_write_role(ctx)?;
        let period = normalize_required_text(period, "emission period", 1, 20)?;
        let id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let active = emissions::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                community_id: ActiveValue::Set(ctx.community_id.clone()),
                period: ActiveValue::Set(period.clone()),
                status: ActiveValue::Set(EmissionStatus::Open.as_str().to_string()),
                closed_at: ActiveValue::Set(None),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Lists the community's emissions, oldest period first.
    pub async fn list_emissions(&self, ctx: &Ctx) -> ResultEngine<Vec<emissions::Model>> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            emissions::Entity::find()
                .filter(emissions::Column::CommunityId.eq(ctx.community_id.clone()))
                .order_by_asc(emissions::Column::Period)
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    /// Links an approved expense into an open emission.
    pub async fn attach_expense_to_emission(
        &self,
        ctx: &Ctx,
        emission_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<()> {
        require_write_role(ctx)?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let emission = self
                .require_emission(&db_tx, &ctx.community_id, emission_id)
                .await?;
            if emission.status != EmissionStatus::Open.as_str() {
                return Err(EngineError::InvalidState(
                    "emission is closed".to_string(),
                ));
            }

            let expense = self.require_expense(&db_tx, ctx, expense_id).await?;
            if expense.status != ExpenseStatus::Approved {
                return Err(EngineError::InvalidState(format!(
                    "only approved expenses can be emitted, status is {}",
                    expense.status.as_str()
                )));
            }

            let existing = emission_items::Entity::find_by_id((
                emission_id.to_string(),
                expense_id.to_string(),
            ))
            .one(&db_tx)
            .await?;
            if existing.is_some() {
                return Err(EngineError::Conflict(
                    "expense already in emission".to_string(),
                ));
            }

            let item = emission_items::ActiveModel {
                emission_id: ActiveValue::Set(emission_id.to_string()),
                expense_id: ActiveValue::Set(expense_id.to_string()),
            };
            item.insert(&db_tx).await?;
            Ok(())
        })
    }

    /// Finalizes an emission; its expenses become immutable for billing
    /// integrity.
    pub async fn close_emission(&self, ctx: &Ctx, emission_id: Uuid) -> ResultEngine<()> {
        require_write_role(ctx)?;

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let emission = self
                .require_emission(&db_tx, &ctx.community_id, emission_id)
                .await?;
            if emission.status != EmissionStatus::Open.as_str() {
                return Err(EngineError::InvalidState(
                    "emission already closed".to_string(),
                ));
            }

            let mut active: emissions::ActiveModel = emission.into();
            active.status = ActiveValue::Set(EmissionStatus::Closed.as_str().to_string());
            active.closed_at = ActiveValue::Set(Some(Utc::now()));
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn require_emission(
        &self,
        db: &DatabaseTransaction,
        community_id: &str,
        emission_id: Uuid,
    ) -> ResultEngine<emissions::Model> {
        emissions::Entity::find_by_id(emission_id.to_string())
            .filter(emissions::Column::CommunityId.eq(community_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("emission not exists".to_string()))
    }

    /// The single guard query behind the annulment rule.
    pub(super) async fn expense_in_closed_emission(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<bool> {
        let rows: Vec<(emission_items::Model, Option<emissions::Model>)> =
            emission_items::Entity::find()
                .filter(emission_items::Column::ExpenseId.eq(expense_id.to_string()))
                .find_also_related(emissions::Entity)
                .all(db)
                .await?;

        Ok(rows.into_iter().any(|(_, emission)| {
            emission.is_some_and(|e| e.status == EmissionStatus::Closed.as_str())
        }))
    }
}
