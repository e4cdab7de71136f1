//! Community and membership operations.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Ctx, EngineError, MemberRole, ResultEngine, communities, community_members};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Creates a community; the creator becomes its admin.
    pub async fn create_community(&self, user_id: &str, name: &str) -> ResultEngine<String> {
        let name = normalize_required_text(name, "community name", 1, 120)?;
        let id = Uuid::new_v4().to_string();

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let community = communities::ActiveModel {
                id: ActiveValue::Set(id.clone()),
                name: ActiveValue::Set(name.clone()),
                created_by: ActiveValue::Set(user_id.to_string()),
            };
            community.insert(&db_tx).await?;

            let member = community_members::ActiveModel {
                community_id: ActiveValue::Set(id.clone()),
                username: ActiveValue::Set(user_id.to_string()),
                role: ActiveValue::Set(MemberRole::Admin.as_str().to_string()),
            };
            member.insert(&db_tx).await?;

            Ok(id.clone())
        })
    }

    /// Adds a member or changes an existing member's role. Admin only.
    pub async fn upsert_member(
        &self,
        ctx: &Ctx,
        username: &str,
        role: MemberRole,
    ) -> ResultEngine<()> {
        if ctx.role != MemberRole::Admin {
            return Err(EngineError::Forbidden(
                "only admins manage members".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            self.require_user_exists(&db_tx, username).await?;

            let existing = community_members::Entity::find_by_id((
                ctx.community_id.clone(),
                username.to_string(),
            ))
            .one(&db_tx)
            .await?;

            match existing {
                Some(row) => {
                    let mut active: community_members::ActiveModel = row.into();
                    active.role = ActiveValue::Set(role.as_str().to_string());
                    active.update(&db_tx).await?;
                }
                None => {
                    let active = community_members::ActiveModel {
                        community_id: ActiveValue::Set(ctx.community_id.clone()),
                        username: ActiveValue::Set(username.to_string()),
                        role: ActiveValue::Set(role.as_str().to_string()),
                    };
                    active.insert(&db_tx).await?;
                }
            }

            Ok(())
        })
    }

    /// Lists the members of the caller's community with their roles.
    pub async fn list_members(&self, ctx: &Ctx) -> ResultEngine<Vec<(String, MemberRole)>> {
        with_tx!(self, |db_tx| {
            self.require_community(&db_tx, &ctx.community_id).await?;
            let rows = community_members::Entity::find()
                .filter(community_members::Column::CommunityId.eq(ctx.community_id.clone()))
                .order_by_asc(community_members::Column::Username)
                .all(&db_tx)
                .await?;
            rows.into_iter()
                .map(|member| {
                    let role = MemberRole::try_from(member.role.as_str())?;
                    Ok((member.username, role))
                })
                .collect()
        })
    }

    /// Lists the communities a user belongs to, with their role in each.
    pub async fn communities_for(
        &self,
        username: &str,
    ) -> ResultEngine<Vec<(communities::Model, MemberRole)>> {
        let memberships: Vec<community_members::Model> = community_members::Entity::find()
            .filter(community_members::Column::Username.eq(username.to_string()))
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let Some(community) =
                communities::Entity::find_by_id(membership.community_id.clone())
                    .one(&self.database)
                    .await?
            else {
                continue;
            };
            out.push((community, MemberRole::try_from(membership.role.as_str())?));
        }
        Ok(out)
    }
}
