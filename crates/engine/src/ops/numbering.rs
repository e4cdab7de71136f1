//! Correlative number assignment.
//!
//! Each community has one counter row per year; the read-increment-format
//! sequence happens inside the caller's DB transaction, so concurrent
//! creates serialize and the sequence stays gap-free. The unique
//! `(community_id, numero)` index on `expenses` backstops the invariant.

use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};

use crate::{ResultEngine, expense_counters};

use super::Engine;

impl Engine {
    /// Returns the next correlative for the community, e.g. `G2024-0001`.
    pub(super) async fn next_correlative(
        &self,
        db: &DatabaseTransaction,
        community_id: &str,
        year: i32,
    ) -> ResultEngine<String> {
        let counter =
            expense_counters::Entity::find_by_id((community_id.to_string(), year)).one(db).await?;

        let seq = match counter {
            Some(row) => {
                let seq = row.next_seq;
                let mut active: expense_counters::ActiveModel = row.into();
                active.next_seq = ActiveValue::Set(seq + 1);
                active.update(db).await?;
                seq
            }
            None => {
                let active = expense_counters::ActiveModel {
                    community_id: ActiveValue::Set(community_id.to_string()),
                    year: ActiveValue::Set(year),
                    next_seq: ActiveValue::Set(2),
                };
                active.insert(db).await?;
                1
            }
        };

        Ok(format!("G{year}-{seq:04}"))
    }
}
