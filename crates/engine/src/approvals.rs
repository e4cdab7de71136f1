//! Approval records: one row per reviewer decision, append-only.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApprovalDecision, EngineError};

/// Domain view of a recorded decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub decision: ApprovalDecision,
    pub observations: Option<String>,
    /// Optional override of the amount the reviewer approved.
    pub approved_amount_minor: Option<i64>,
    pub decided_by: String,
    pub decided_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_approvals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub decision: String,
    pub observations: Option<String>,
    pub approved_amount_minor: Option<i64>,
    pub decided_by: String,
    pub decided_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Approval {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Validation("invalid approval id".to_string()))?,
            expense_id: Uuid::parse_str(&model.expense_id)
                .map_err(|_| EngineError::Validation("invalid expense id".to_string()))?,
            decision: ApprovalDecision::try_from(model.decision.as_str())?,
            observations: model.observations,
            approved_amount_minor: model.approved_amount_minor,
            decided_by: model.decided_by,
            decided_at: model.decided_at,
        })
    }
}
