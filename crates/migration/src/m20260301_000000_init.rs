//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Cuentas Claras:
//!
//! - `users`: authentication
//! - `communities`: scoping root for everything else
//! - `community_members`: per-community roles (admin/manager/resident)
//! - `categories`, `cost_centers`, `providers`, `purchase_documents`:
//!   collaborator stores referenced by expenses
//! - `expenses`: the lifecycle-managed gasto records
//! - `expense_counters`: per-community correlative sequences
//! - `expense_approvals`: append-only reviewer decisions
//! - `expense_history`: append-only field-change audit trail
//! - `emissions` / `emission_items`: billing batches and their expenses

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Communities {
    Table,
    Id,
    Name,
    CreatedBy,
}

#[derive(Iden)]
enum CommunityMembers {
    Table,
    CommunityId,
    Username,
    Role,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    CommunityId,
    Name,
    Archived,
}

#[derive(Iden)]
enum CostCenters {
    Table,
    Id,
    CommunityId,
    Name,
    Code,
    Archived,
}

#[derive(Iden)]
enum Providers {
    Table,
    Id,
    CommunityId,
    Name,
    TaxId,
    Active,
}

#[derive(Iden)]
enum PurchaseDocuments {
    Table,
    Id,
    CommunityId,
    ProviderId,
    DocType,
    Folio,
    IssuedAt,
    TotalMinor,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    CommunityId,
    Numero,
    CategoryId,
    CostCenterId,
    ProviderId,
    PurchaseDocumentId,
    Fecha,
    AmountMinor,
    Glosa,
    Extraordinary,
    Status,
    CreatedBy,
    ApprovedBy,
    AnnulReason,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ExpenseCounters {
    Table,
    CommunityId,
    Year,
    NextSeq,
}

#[derive(Iden)]
enum ExpenseApprovals {
    Table,
    Id,
    ExpenseId,
    Decision,
    Observations,
    ApprovedAmountMinor,
    DecidedBy,
    DecidedAt,
}

#[derive(Iden)]
enum ExpenseHistory {
    Table,
    Id,
    ExpenseId,
    Field,
    OldValue,
    NewValue,
    ChangedBy,
    ChangedAt,
}

#[derive(Iden)]
enum Emissions {
    Table,
    Id,
    CommunityId,
    Period,
    Status,
    ClosedAt,
}

#[derive(Iden)]
enum EmissionItems {
    Table,
    EmissionId,
    ExpenseId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Communities & memberships
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Communities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Communities::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Communities::Name).string().not_null())
                    .col(ColumnDef::new(Communities::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-communities-created_by")
                            .from(Communities::Table, Communities::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommunityMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommunityMembers::CommunityId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CommunityMembers::Username)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommunityMembers::Role).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(CommunityMembers::CommunityId)
                            .col(CommunityMembers::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-community_members-community_id")
                            .from(CommunityMembers::Table, CommunityMembers::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-community_members-username")
                            .from(CommunityMembers::Table, CommunityMembers::Username)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Collaborator stores
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::CommunityId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Categories::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-community_id")
                            .from(Categories::Table, Categories::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-community_id-name-unique")
                    .table(Categories::Table)
                    .col(Categories::CommunityId)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CostCenters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostCenters::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CostCenters::CommunityId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CostCenters::Name).string().not_null())
                    .col(ColumnDef::new(CostCenters::Code).string().not_null())
                    .col(
                        ColumnDef::new(CostCenters::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cost_centers-community_id")
                            .from(CostCenters::Table, CostCenters::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Providers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Providers::CommunityId).string().not_null())
                    .col(ColumnDef::new(Providers::Name).string().not_null())
                    .col(ColumnDef::new(Providers::TaxId).string())
                    .col(
                        ColumnDef::new(Providers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-providers-community_id")
                            .from(Providers::Table, Providers::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseDocuments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PurchaseDocuments::CommunityId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PurchaseDocuments::ProviderId).string())
                    .col(
                        ColumnDef::new(PurchaseDocuments::DocType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PurchaseDocuments::Folio).string().not_null())
                    .col(
                        ColumnDef::new(PurchaseDocuments::IssuedAt)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseDocuments::TotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchase_documents-community_id")
                            .from(PurchaseDocuments::Table, PurchaseDocuments::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchase_documents-provider_id")
                            .from(PurchaseDocuments::Table, PurchaseDocuments::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses & correlative counters
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::CommunityId).string().not_null())
                    .col(ColumnDef::new(Expenses::Numero).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(ColumnDef::new(Expenses::CostCenterId).string())
                    .col(ColumnDef::new(Expenses::ProviderId).string())
                    .col(ColumnDef::new(Expenses::PurchaseDocumentId).string())
                    .col(ColumnDef::new(Expenses::Fecha).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Glosa).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Extraordinary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::Status).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::ApprovedBy).string())
                    .col(ColumnDef::new(Expenses::AnnulReason).string())
                    .col(ColumnDef::new(Expenses::Version).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-community_id")
                            .from(Expenses::Table, Expenses::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-community_id-numero-unique")
                    .table(Expenses::Table)
                    .col(Expenses::CommunityId)
                    .col(Expenses::Numero)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-community_id-status")
                    .table(Expenses::Table)
                    .col(Expenses::CommunityId)
                    .col(Expenses::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseCounters::CommunityId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseCounters::Year).integer().not_null())
                    .col(
                        ColumnDef::new(ExpenseCounters::NextSeq)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExpenseCounters::CommunityId)
                            .col(ExpenseCounters::Year),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_counters-community_id")
                            .from(ExpenseCounters::Table, ExpenseCounters::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Approvals & history (append-only)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseApprovals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseApprovals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseApprovals::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseApprovals::Decision)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseApprovals::Observations).string())
                    .col(ColumnDef::new(ExpenseApprovals::ApprovedAmountMinor).big_integer())
                    .col(
                        ColumnDef::new(ExpenseApprovals::DecidedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseApprovals::DecidedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_approvals-expense_id")
                            .from(ExpenseApprovals::Table, ExpenseApprovals::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseHistory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseHistory::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseHistory::Field).string().not_null())
                    .col(ColumnDef::new(ExpenseHistory::OldValue).string())
                    .col(ColumnDef::new(ExpenseHistory::NewValue).string())
                    .col(
                        ColumnDef::new(ExpenseHistory::ChangedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseHistory::ChangedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_history-expense_id")
                            .from(ExpenseHistory::Table, ExpenseHistory::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Emissions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Emissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Emissions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Emissions::CommunityId).string().not_null())
                    .col(ColumnDef::new(Emissions::Period).string().not_null())
                    .col(ColumnDef::new(Emissions::Status).string().not_null())
                    .col(ColumnDef::new(Emissions::ClosedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-emissions-community_id")
                            .from(Emissions::Table, Emissions::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmissionItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmissionItems::EmissionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmissionItems::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmissionItems::EmissionId)
                            .col(EmissionItems::ExpenseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-emission_items-emission_id")
                            .from(EmissionItems::Table, EmissionItems::EmissionId)
                            .to(Emissions::Table, Emissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-emission_items-expense_id")
                            .from(EmissionItems::Table, EmissionItems::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(EmissionItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Emissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseApprovals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseCounters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CostCenters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommunityMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Communities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
