//! Notification dispatcher
//!
//! A send is two steps, store the notification then fan it out to the
//! recipients, and both run on one transaction so neither is ever visible
//! without the other.

use crate::error::SendNotificationError;
use crate::notifications::{add_notification_to_users, save_notification, LiveNotifier, Notification};
use crate::orm::notifications;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

/// Store and fan out a notification in a transaction owned by this call
///
/// Commits when both steps succeed and rolls back otherwise.
pub async fn send_notification(
    db: &DatabaseConnection,
    recipients: &[String],
    notification: &Notification,
) -> Result<notifications::Model, SendNotificationError> {
    let txn = db.begin().await?;

    match send_notification_in(&txn, recipients, notification).await {
        Ok(saved) => {
            txn.commit().await?;
            Ok(saved)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!("Failed to roll back notification send: {}", rollback_err);
            }
            Err(err)
        }
    }
}

/// Store and fan out a notification on a transaction the caller owns
///
/// Never commits or rolls back; the caller decides the outcome.
pub async fn send_notification_in(
    txn: &DatabaseTransaction,
    recipients: &[String],
    notification: &Notification,
) -> Result<notifications::Model, SendNotificationError> {
    let saved = save_notification(txn, notification)
        .await
        .map_err(SendNotificationError::Save)?;

    add_notification_to_users(txn, recipients, &saved)
        .await
        .map_err(SendNotificationError::Deliver)?;

    Ok(saved)
}

/// Send, then push the stored notification to every recipient's live sessions
pub async fn send_and_push(
    db: &DatabaseConnection,
    notifier: &dyn LiveNotifier,
    recipients: &[String],
    notification: &Notification,
) -> Result<notifications::Model, SendNotificationError> {
    let saved = send_notification(db, recipients, notification).await?;

    for username in recipients {
        notifier.push(username, &saved);
    }

    Ok(saved)
}
