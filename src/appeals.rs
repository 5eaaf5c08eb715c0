//! Ban appeals
//!
//! A banned member may ask a community's staff to lift their ban. Writing an
//! appeal happens on a transaction the caller owns so it can be grouped with
//! other writes, such as notifying the staff.

use crate::community::find_community;
use crate::error::AppealError;
use crate::notifications::{send_notification_in, LiveNotifier, Notification, NotificationType};
use crate::orm::appeals;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, Set,
    TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAppeal {
    pub community_id: i32,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 2000, message = "description must be 1-2000 characters"))]
    pub description: String,
    #[serde(default)]
    pub appeal_date_time: Option<NaiveDateTime>,
}

/// Store an appeal on the caller's transaction
///
/// Only members currently in the community's banned set may appeal.
pub async fn save_appeal(
    txn: &DatabaseTransaction,
    appeal: NewAppeal,
) -> Result<appeals::Model, AppealError> {
    let description = appeal.description.trim();
    if description.is_empty() {
        return Err(AppealError::Invalid("An appeal description is required".to_string()));
    }

    let community = find_community(txn, appeal.community_id)
        .await?
        .ok_or(AppealError::CommunityNotFound)?;

    if !community.is_banned(&appeal.username) {
        return Err(AppealError::NotBanned);
    }

    let saved = appeals::ActiveModel {
        community_id: Set(community.id),
        username: Set(appeal.username),
        description: Set(description.to_owned()),
        appeal_date_time: Set(appeal
            .appeal_date_time
            .unwrap_or_else(|| Utc::now().naive_utc())),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    Ok(saved)
}

/// Store an appeal and tell the community staff about it, all or nothing
pub async fn file_appeal(
    db: &DatabaseConnection,
    notifier: &dyn LiveNotifier,
    appeal: NewAppeal,
) -> Result<appeals::Model, AppealError> {
    // Dropping the transaction on an early return rolls it back
    let txn = db.begin().await?;

    let saved = save_appeal(&txn, appeal).await?;
    let community = find_community(&txn, saved.community_id)
        .await?
        .ok_or(AppealError::CommunityNotFound)?;
    let staff = community.staff();

    let notification = Notification {
        title: format!("New ban appeal in {}", community.name),
        msg: format!("{} has appealed their ban.", saved.username),
        sender: saved.username.clone(),
        date_time: saved.appeal_date_time,
        context_id: Some(community.id),
        notification_type: NotificationType::Community,
    };
    // Staff who cannot be notified (no user rows) fail the whole appeal, so
    // an appeal is never stored without someone being told about it.
    let stored = send_notification_in(&txn, &staff, &notification).await?;

    txn.commit().await?;

    for username in &staff {
        notifier.push(username, &stored);
    }

    Ok(saved)
}

/// Appeals filed in a community, oldest first
pub async fn get_appeals_by_community<C: ConnectionTrait>(
    conn: &C,
    community_id: i32,
) -> Result<Vec<appeals::Model>, DbErr> {
    appeals::Entity::find()
        .filter(appeals::Column::CommunityId.eq(community_id))
        .order_by_asc(appeals::Column::AppealDateTime)
        .order_by_asc(appeals::Column::Id)
        .all(conn)
        .await
}
