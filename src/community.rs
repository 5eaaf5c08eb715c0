//! Community membership
//!
//! A community is stored as a row plus membership and ban rows. Services load
//! it as one `Community` value with its role sets filled in.

use crate::orm::community_members::MemberRole;
use crate::orm::{communities, community_bans, community_members};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::OnConflict, ConnectionTrait, DatabaseTransaction, DbErr, Set,
};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub admin: String,
    pub moderators: BTreeSet<String>,
    pub participants: BTreeSet<String>,
    pub banned: BTreeSet<String>,
}

impl Community {
    pub fn is_participant(&self, username: &str) -> bool {
        self.participants.contains(username)
    }

    pub fn is_banned(&self, username: &str) -> bool {
        self.banned.contains(username)
    }

    pub fn is_admin_or_moderator(&self, username: &str) -> bool {
        self.admin == username || self.moderators.contains(username)
    }

    /// Admin first, then moderators, without duplicates.
    pub fn staff(&self) -> Vec<String> {
        let mut staff = vec![self.admin.clone()];
        staff.extend(
            self.moderators
                .iter()
                .filter(|m| **m != self.admin)
                .cloned(),
        );
        staff
    }
}

/// Load a community with its member and ban sets
pub async fn find_community<C: ConnectionTrait>(
    conn: &C,
    community_id: i32,
) -> Result<Option<Community>, DbErr> {
    let community = match communities::Entity::find_by_id(community_id).one(conn).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    let members = community_members::Entity::find()
        .filter(community_members::Column::CommunityId.eq(community_id))
        .all(conn)
        .await?;

    let banned = community_bans::Entity::find()
        .select_only()
        .column(community_bans::Column::Username)
        .filter(community_bans::Column::CommunityId.eq(community_id))
        .into_tuple::<String>()
        .all(conn)
        .await?;

    let mut moderators = BTreeSet::new();
    let mut participants = BTreeSet::new();
    for member in members {
        match member.role {
            MemberRole::Moderator => moderators.insert(member.username),
            MemberRole::Participant => participants.insert(member.username),
        };
    }

    Ok(Some(Community {
        id: community.id,
        name: community.name,
        description: community.description,
        admin: community.admin,
        moderators,
        participants,
        banned: banned.into_iter().collect(),
    }))
}

/// Create a community. The admin is enrolled as a participant.
pub async fn create_community<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    description: &str,
    admin: &str,
) -> Result<communities::Model, DbErr> {
    let community = communities::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(description.to_owned()),
        admin: Set(admin.to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    add_member(conn, community.id, admin, MemberRole::Participant).await?;

    Ok(community)
}

/// Give a user a role in a community. Adding an existing role is a no-op.
pub async fn add_member<C: ConnectionTrait>(
    conn: &C,
    community_id: i32,
    username: &str,
    role: MemberRole,
) -> Result<(), DbErr> {
    community_members::Entity::insert(community_members::ActiveModel {
        community_id: Set(community_id),
        username: Set(username.to_owned()),
        role: Set(role),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            community_members::Column::CommunityId,
            community_members::Column::Username,
            community_members::Column::Role,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    Ok(())
}

/// Ban a user and strip every role they hold, on the caller's transaction
///
/// Adding to the banned set is idempotent.
pub async fn ban_member(
    txn: &DatabaseTransaction,
    community_id: i32,
    username: &str,
    reason: &str,
) -> Result<(), DbErr> {
    community_bans::Entity::insert(community_bans::ActiveModel {
        community_id: Set(community_id),
        username: Set(username.to_owned()),
        reason: Set(reason.to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            community_bans::Column::CommunityId,
            community_bans::Column::Username,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;

    community_members::Entity::delete_many()
        .filter(community_members::Column::CommunityId.eq(community_id))
        .filter(community_members::Column::Username.eq(username))
        .exec(txn)
        .await?;

    Ok(())
}
