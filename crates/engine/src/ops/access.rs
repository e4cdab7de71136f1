//! Existence and membership checks shared by all ops.
//!
//! The engine validates that referenced collaborators (category, cost
//! center, provider, purchase document) exist in the caller's community;
//! it never owns their lifecycle beyond the minimal create operations in
//! `catalog.rs`.

use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MemberRole, ResultEngine, categories, communities, community_members,
    cost_centers, providers, purchase_documents, users,
};

use super::{Engine, with_tx};

/// Generates `_exists_in_community` and `require_in_community` methods
/// for a referenced entity.
macro_rules! impl_target_in_community {
    ($exists_fn:ident, $require_fn:ident, $entity:path, $community_col:expr, $err_msg:literal) => {
        async fn $exists_fn(
            &self,
            db: &DatabaseTransaction,
            community_id: &str,
            target_id: Uuid,
        ) -> ResultEngine<bool> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($community_col.eq(community_id.to_string()))
                .one(db)
                .await
                .map(|model| model.is_some())
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            community_id: &str,
            target_id: Uuid,
        ) -> ResultEngine<()> {
            if !self.$exists_fn(db, community_id, target_id).await? {
                return Err(EngineError::NotFound($err_msg.to_string()));
            }
            Ok(())
        }
    };
}

impl Engine {
    impl_target_in_community!(
        category_exists_in_community,
        require_category_in_community,
        categories::Entity,
        categories::Column::CommunityId,
        "category not exists"
    );

    impl_target_in_community!(
        cost_center_exists_in_community,
        require_cost_center_in_community,
        cost_centers::Entity,
        cost_centers::Column::CommunityId,
        "cost_center not exists"
    );

    impl_target_in_community!(
        provider_exists_in_community,
        require_provider_in_community,
        providers::Entity,
        providers::Column::CommunityId,
        "provider not exists"
    );

    impl_target_in_community!(
        purchase_document_exists_in_community,
        require_purchase_document_in_community,
        purchase_documents::Entity,
        purchase_documents::Column::CommunityId,
        "purchase_document not exists"
    );

    pub(super) async fn require_community(
        &self,
        db: &DatabaseTransaction,
        community_id: &str,
    ) -> ResultEngine<communities::Model> {
        communities::Entity::find_by_id(community_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("community not exists".to_string()))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::NotFound("user not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn member_role_tx(
        &self,
        db: &DatabaseTransaction,
        community_id: &str,
        username: &str,
    ) -> ResultEngine<Option<MemberRole>> {
        let row = community_members::Entity::find_by_id((
            community_id.to_string(),
            username.to_string(),
        ))
        .one(db)
        .await?;
        row.as_ref()
            .map(|m| MemberRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Resolves a user's role in a community, for building a [`crate::Ctx`].
    ///
    /// Returns `NotFound` when the community does not exist or the user is
    /// not a member, so non-members cannot probe for community ids.
    pub async fn member_role(
        &self,
        community_id: &str,
        username: &str,
    ) -> ResultEngine<MemberRole> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, community_id).await?;
            self.member_role_tx(&db_tx, community_id, username)
                .await?
                .ok_or_else(|| EngineError::NotFound("community not exists".to_string()))
        })
    }
}
