//! Emission items: which expenses are apportioned in which emission.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "emission_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub emission_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::emissions::Entity",
        from = "Column::EmissionId",
        to = "super::emissions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Emission,
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
}

impl Related<super::emissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Emission.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
