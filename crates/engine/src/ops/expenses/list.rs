//! Expense reads: get, filtered listing, history and approval trails.

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Approval, Ctx, Expense, ExpenseListFilter, HistoryEntry, ResultEngine, approvals, expenses,
    history,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Returns one expense in the caller's community.
    pub async fn expense(&self, ctx: &Ctx, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            self.require_expense(&db_tx, ctx, expense_id).await
        })
    }

    /// Lists expenses matching the filter, ordered by correlative number.
    pub async fn list_expenses(
        &self,
        ctx: &Ctx,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;

            let mut query = expenses::Entity::find()
                .filter(expenses::Column::CommunityId.eq(ctx.community_id.clone()))
                .order_by_asc(expenses::Column::Numero)
                .limit(filter.limit)
                .offset(filter.offset);

            if let Some(status) = filter.status {
                query = query.filter(expenses::Column::Status.eq(status.as_str()));
            }
            if let Some(category_id) = filter.category_id {
                query = query.filter(expenses::Column::CategoryId.eq(category_id.to_string()));
            }
            if let Some(extraordinary) = filter.extraordinary {
                query = query.filter(expenses::Column::Extraordinary.eq(extraordinary));
            }
            if let Some(from) = filter.from {
                query = query.filter(expenses::Column::Fecha.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(expenses::Column::Fecha.lte(to));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }

    /// Chronological field-change history of an expense.
    pub async fn expense_history(
        &self,
        ctx: &Ctx,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<HistoryEntry>> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            self.require_expense(&db_tx, ctx, expense_id).await?;

            let models = history::Entity::find()
                .filter(history::Column::ExpenseId.eq(expense_id.to_string()))
                .order_by_asc(history::Column::ChangedAt)
                .order_by_asc(history::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(HistoryEntry::try_from).collect()
        })
    }

    /// Chronological approval decisions recorded against an expense.
    pub async fn expense_approvals(
        &self,
        ctx: &Ctx,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<Approval>> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            self.require_expense(&db_tx, ctx, expense_id).await?;

            let models = approvals::Entity::find()
                .filter(approvals::Column::ExpenseId.eq(expense_id.to_string()))
                .order_by_asc(approvals::Column::DecidedAt)
                .order_by_asc(approvals::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Approval::try_from).collect()
        })
    }
}
