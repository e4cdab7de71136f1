//! Expense primitives.
//!
//! An `Expense` (gasto) is a community cost with a human-readable
//! correlative number and a lifecycle status; transitions go through the
//! engine ops only.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ExpenseStatus};

/// Domain view of an expense row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub community_id: String,
    /// Correlative number, e.g. `G2024-0001`, unique per community.
    pub numero: String,
    pub category_id: Uuid,
    pub cost_center_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub purchase_document_id: Option<Uuid>,
    pub fecha: NaiveDate,
    pub amount_minor: i64,
    pub glosa: String,
    pub extraordinary: bool,
    pub status: ExpenseStatus,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub annul_reason: Option<String>,
    /// Optimistic concurrency token, bumped on every write.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub community_id: String,
    pub numero: String,
    pub category_id: String,
    pub cost_center_id: Option<String>,
    pub provider_id: Option<String>,
    pub purchase_document_id: Option<String>,
    pub fecha: Date,
    pub amount_minor: i64,
    pub glosa: String,
    pub extraordinary: bool,
    pub status: String,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub annul_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::communities::Entity",
        from = "Column::CommunityId",
        to = "super::communities::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Community,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(has_many = "super::approvals::Entity")]
    Approvals,
    #[sea_orm(has_many = "super::history::Entity")]
    History,
}

impl Related<super::communities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Community.def()
    }
}

impl Related<super::approvals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl Related<super::history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            community_id: ActiveValue::Set(expense.community_id.clone()),
            numero: ActiveValue::Set(expense.numero.clone()),
            category_id: ActiveValue::Set(expense.category_id.to_string()),
            cost_center_id: ActiveValue::Set(expense.cost_center_id.map(|id| id.to_string())),
            provider_id: ActiveValue::Set(expense.provider_id.map(|id| id.to_string())),
            purchase_document_id: ActiveValue::Set(
                expense.purchase_document_id.map(|id| id.to_string()),
            ),
            fecha: ActiveValue::Set(expense.fecha),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            glosa: ActiveValue::Set(expense.glosa.clone()),
            extraordinary: ActiveValue::Set(expense.extraordinary),
            status: ActiveValue::Set(expense.status.as_str().to_string()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            approved_by: ActiveValue::Set(expense.approved_by.clone()),
            annul_reason: ActiveValue::Set(expense.annul_reason.clone()),
            version: ActiveValue::Set(expense.version),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

fn parse_id(value: &str, what: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {what} id")))
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&model.id, "expense")?,
            community_id: model.community_id,
            numero: model.numero,
            category_id: parse_id(&model.category_id, "category")?,
            cost_center_id: model
                .cost_center_id
                .as_deref()
                .map(|id| parse_id(id, "cost_center"))
                .transpose()?,
            provider_id: model
                .provider_id
                .as_deref()
                .map(|id| parse_id(id, "provider"))
                .transpose()?,
            purchase_document_id: model
                .purchase_document_id
                .as_deref()
                .map(|id| parse_id(id, "purchase_document"))
                .transpose()?,
            fecha: model.fecha,
            amount_minor: model.amount_minor,
            glosa: model.glosa,
            extraordinary: model.extraordinary,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            approved_by: model.approved_by,
            annul_reason: model.annul_reason,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
