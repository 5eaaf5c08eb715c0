//! Notification system: persistence, fan-out to recipients and the read side

pub mod dispatcher;
pub mod live;
pub mod types;

use crate::error::NotificationError;
use crate::orm::{notifications, user_notifications, users};
use chrono::NaiveDateTime;
use sea_orm::{entity::*, query::*, sea_query::Expr, ConnectionTrait, DbErr, JoinType, Set};
use serde::{Deserialize, Serialize};

pub use dispatcher::{send_notification, send_notification_in};
pub use live::{LiveNotifier, NullNotifier};
pub use types::NotificationType;

/// A notification that has not been stored yet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub msg: String,
    pub sender: String,
    pub date_time: NaiveDateTime,
    pub context_id: Option<i32>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

/// Per-category unread state of one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadFlags {
    pub community_notifs: bool,
    pub message_notifs: bool,
}

impl UnreadFlags {
    /// Raise the flag a delivered notification of this type sets.
    /// Returns whether anything changed.
    pub fn raise(&mut self, notification_type: NotificationType) -> bool {
        let flag = match notification_type {
            NotificationType::Community => &mut self.community_notifs,
            NotificationType::Message => &mut self.message_notifs,
            NotificationType::Ban | NotificationType::Other => return false,
        };
        !std::mem::replace(flag, true)
    }
}

impl From<&users::Model> for UnreadFlags {
    fn from(user: &users::Model) -> Self {
        Self {
            community_notifs: user.community_notifs,
            message_notifs: user.message_notifs,
        }
    }
}

/// Persist a notification record
pub async fn save_notification<C: ConnectionTrait>(
    conn: &C,
    notification: &Notification,
) -> Result<notifications::Model, NotificationError> {
    let model = notifications::ActiveModel {
        title: Set(notification.title.clone()),
        msg: Set(notification.msg.clone()),
        sender: Set(notification.sender.clone()),
        date_time: Set(notification.date_time),
        context_id: Set(notification.context_id),
        type_: Set(notification.notification_type),
        ..Default::default()
    };

    Ok(model.insert(conn).await?)
}

/// Attach a stored notification to every recipient and raise their unread flag
///
/// Which flag is raised depends on the notification type; types without a
/// flag are still attached. Recipients that do not exist are skipped, but if
/// none of them exist the call fails with `UpdateFailed`.
pub async fn add_notification_to_users<C: ConnectionTrait>(
    conn: &C,
    recipients: &[String],
    notification: &notifications::Model,
) -> Result<(), NotificationError> {
    if notification.msg.trim().is_empty()
        || notification.sender.trim().is_empty()
        || notification.title.trim().is_empty()
    {
        return Err(NotificationError::InvalidNotification);
    }

    if recipients.is_empty() {
        return Ok(());
    }

    let user_ids: Vec<i32> = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .filter(users::Column::Username.is_in(recipients.iter().cloned()))
        .into_tuple()
        .all(conn)
        .await?;

    if user_ids.is_empty() {
        return Err(NotificationError::UpdateFailed);
    }

    user_notifications::Entity::insert_many(user_ids.iter().map(|&user_id| {
        user_notifications::ActiveModel {
            user_id: Set(user_id),
            notification_id: Set(notification.id),
            ..Default::default()
        }
    }))
    .exec_without_returning(conn)
    .await?;

    if let Some(flag) = notification.type_.unread_flag() {
        let result = users::Entity::update_many()
            .col_expr(flag, Expr::value(true))
            .filter(users::Column::Id.is_in(user_ids))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(NotificationError::UpdateFailed);
        }
    }

    Ok(())
}

/// Fetch the most recent notifications delivered to a user
pub async fn get_user_notifications<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    limit: u64,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .inner_join(user_notifications::Entity)
        .join(JoinType::InnerJoin, user_notifications::Relation::User.def())
        .filter(users::Column::Username.eq(username))
        .order_by_desc(notifications::Column::DateTime)
        .order_by_desc(notifications::Column::Id)
        .limit(limit)
        .all(conn)
        .await
}

/// Current unread flags for a user, `None` if the user does not exist
pub async fn unread_flags<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<UnreadFlags>, DbErr> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await?;

    Ok(user.as_ref().map(UnreadFlags::from))
}

/// Lower the unread flag for one category
pub async fn clear_unread<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    notification_type: NotificationType,
) -> Result<UnreadFlags, NotificationError> {
    if let Some(flag) = notification_type.unread_flag() {
        users::Entity::update_many()
            .col_expr(flag, Expr::value(false))
            .filter(users::Column::Username.eq(username))
            .exec(conn)
            .await?;
    }

    unread_flags(conn, username)
        .await?
        .ok_or(NotificationError::UpdateFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_reports_changes_only() {
        let mut flags = UnreadFlags::default();

        assert!(flags.raise(NotificationType::Community));
        assert!(!flags.raise(NotificationType::Community));
        assert!(!flags.raise(NotificationType::Ban));
        assert!(flags.raise(NotificationType::Message));
        assert_eq!(
            flags,
            UnreadFlags {
                community_notifs: true,
                message_notifs: true
            }
        );
    }
}
