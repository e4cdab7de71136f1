//! Expense lifecycle operations.
//!
//! Reads live in `list`, state changes in `write`. Shared here: the
//! community-scoped loader, the append-only history writer and the
//! optimistic-version update every state change goes through.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Ctx, EngineError, Expense, ResultEngine, expenses, history};

use super::Engine;

mod list;
mod write;

impl Engine {
    pub(super) async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        ctx: &Ctx,
        expense_id: Uuid,
    ) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .filter(expenses::Column::CommunityId.eq(ctx.community_id.clone()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense not exists".to_string()))?;
        Expense::try_from(model)
    }

    pub(super) async fn record_history(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        field: &str,
        old_value: Option<String>,
        new_value: Option<String>,
        changed_by: &str,
    ) -> ResultEngine<()> {
        let row = history::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            expense_id: ActiveValue::Set(expense_id.to_string()),
            field: ActiveValue::Set(field.to_string()),
            old_value: ActiveValue::Set(old_value),
            new_value: ActiveValue::Set(new_value),
            changed_by: ActiveValue::Set(changed_by.to_string()),
            changed_at: ActiveValue::Set(Utc::now()),
        };
        row.insert(db).await?;
        Ok(())
    }

    /// Applies a patch iff the stored row still carries `expected_version`.
    ///
    /// The patch must already set the bumped version; zero affected rows
    /// means another request won the race.
    pub(super) async fn apply_versioned_update(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        expected_version: i64,
        patch: expenses::ActiveModel,
    ) -> ResultEngine<()> {
        let result = expenses::Entity::update_many()
            .set(patch)
            .filter(expenses::Column::Id.eq(expense_id.to_string()))
            .filter(expenses::Column::Version.eq(expected_version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "expense was modified concurrently".to_string(),
            ));
        }
        Ok(())
    }
}

/// Renders a field value for a history row.
pub(super) fn history_value(value: impl ToString) -> Option<String> {
    Some(value.to_string())
}

pub(super) fn history_opt_uuid(value: Option<Uuid>) -> Option<String> {
    value.map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::{ActiveValue, ConnectionTrait, Database, Statement, TransactionTrait};

    use crate::{CreateExpenseCmd, Ctx, Engine, EngineError, Expense, MemberRole, expenses};
    use migration::MigratorTrait;

    async fn engine_with_expense() -> (Engine, Expense) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["alice".into(), "password".into()],
        ))
        .await
        .unwrap();

        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
        let community_id = engine
            .create_community("alice", "Los Aromos")
            .await
            .unwrap();
        let ctx = Ctx::new("alice", &community_id, MemberRole::Admin);
        let category_id = engine.create_category(&ctx, "Mantención").await.unwrap();
        let expense = engine
            .create_expense(
                &ctx,
                CreateExpenseCmd::new(
                    category_id,
                    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                    1_000,
                    "Gasto menor",
                ),
            )
            .await
            .unwrap();
        (engine, expense)
    }

    #[tokio::test]
    async fn stale_version_write_is_a_conflict() {
        let (engine, expense) = engine_with_expense().await;

        // A writer holding an outdated version must lose the race.
        let db_tx = engine.database.begin().await.unwrap();
        let patch = expenses::ActiveModel {
            version: ActiveValue::Set(expense.version + 1),
            ..Default::default()
        };
        let err = engine
            .apply_versioned_update(&db_tx, expense.id, expense.version + 5, patch)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Conflict("expense was modified concurrently".to_string())
        );

        // The current version still applies.
        let patch = expenses::ActiveModel {
            version: ActiveValue::Set(expense.version + 1),
            ..Default::default()
        };
        engine
            .apply_versioned_update(&db_tx, expense.id, expense.version, patch)
            .await
            .unwrap();
        db_tx.commit().await.unwrap();
    }
}
