//! Collaborator stores: categories, cost centers, providers and purchase
//! documents.
//!
//! The lifecycle manager only needs these to exist so expense references
//! can be validated; the operations here are the minimal create/list set.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Ctx, EngineError, ResultEngine, categories, cost_centers, providers, purchase_documents,
};

use super::{
    Engine, normalize_optional_text, normalize_required_text, require_write_role, validate_amount,
    with_tx,
};

impl Engine {
    pub async fn create_category(&self, ctx: &Ctx, name: &str) -> ResultEngine<Uuid> {
        require_write_role(ctx)?;
        let name = normalize_required_text(name, "category name", 1, 80)?;
        let id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;

            let duplicate = categories::Entity::find()
                .filter(categories::Column::CommunityId.eq(ctx.community_id.clone()))
                .filter(categories::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Conflict(format!(
                    "category \"{name}\" already exists"
                )));
            }

            let active = categories::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                community_id: ActiveValue::Set(ctx.community_id.clone()),
                name: ActiveValue::Set(name.clone()),
                archived: ActiveValue::Set(false),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    pub async fn list_categories(&self, ctx: &Ctx) -> ResultEngine<Vec<categories::Model>> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            categories::Entity::find()
                .filter(categories::Column::CommunityId.eq(ctx.community_id.clone()))
                .filter(categories::Column::Archived.eq(false))
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    pub async fn create_cost_center(
        &self,
        ctx: &Ctx,
        name: &str,
        code: &str,
    ) -> ResultEngine<Uuid> {
        require_write_role(ctx)?;
        let name = normalize_required_text(name, "cost center name", 1, 80)?;
        let code = normalize_required_text(code, "cost center code", 1, 20)?;
        let id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let active = cost_centers::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                community_id: ActiveValue::Set(ctx.community_id.clone()),
                name: ActiveValue::Set(name.clone()),
                code: ActiveValue::Set(code.clone()),
                archived: ActiveValue::Set(false),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    pub async fn create_provider(
        &self,
        ctx: &Ctx,
        name: &str,
        tax_id: Option<&str>,
    ) -> ResultEngine<Uuid> {
        require_write_role(ctx)?;
        let name = normalize_required_text(name, "provider name", 1, 120)?;
        let tax_id = normalize_optional_text(tax_id);
        let id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let active = providers::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                community_id: ActiveValue::Set(ctx.community_id.clone()),
                name: ActiveValue::Set(name.clone()),
                tax_id: ActiveValue::Set(tax_id.clone()),
                active: ActiveValue::Set(true),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    pub async fn create_purchase_document(
        &self,
        ctx: &Ctx,
        provider_id: Option<Uuid>,
        doc_type: &str,
        folio: &str,
        issued_at: NaiveDate,
        total_minor: i64,
    ) -> ResultEngine<Uuid> {
        require_write_role(ctx)?;
        let doc_type = normalize_required_text(doc_type, "document type", 1, 40)?;
        let folio = normalize_required_text(folio, "folio", 1, 40)?;
        let total_minor = validate_amount(total_minor)?;
        let id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            if let Some(provider_id) = provider_id {
                self.require_provider_in_community(&db_tx, &ctx.community_id, provider_id)
                    .await?;
            }
            let active = purchase_documents::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                community_id: ActiveValue::Set(ctx.community_id.clone()),
                provider_id: ActiveValue::Set(provider_id.map(|p| p.to_string())),
                doc_type: ActiveValue::Set(doc_type.clone()),
                folio: ActiveValue::Set(folio.clone()),
                issued_at: ActiveValue::Set(issued_at),
                total_minor: ActiveValue::Set(total_minor),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }
}
