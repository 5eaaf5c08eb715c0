//! Automatic bans driven by member reports
//!
//! Once enough distinct members have reported someone in a community, that
//! person is banned without waiting for a moderator. The count is over
//! reporter identities, not report rows.

use crate::community::{ban_member, find_community, Community};
use crate::notifications::dispatcher::send_and_push;
use crate::notifications::{LiveNotifier, Notification, NotificationType};
use crate::orm::reports;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait,
};
use serde::Serialize;

/// Sender name on notifications raised by the auto-moderator
pub const AUTO_MODERATOR: &str = "system";

/// What the auto-ban check decided
///
/// Never an error type: infrastructure failures come back in `error` with
/// `banned` false so callers branch on the value instead of propagating.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoBanOutcome {
    pub banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AutoBanOutcome {
    pub fn not_banned() -> Self {
        Self::default()
    }

    pub fn banned(report_count: u64) -> Self {
        Self {
            banned: true,
            report_count: Some(report_count),
            ..Default::default()
        }
    }

    pub fn skipped(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_owned()),
            ..Default::default()
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Number of different members who reported `reported_user` in a community
pub async fn count_distinct_reporters<C: ConnectionTrait>(
    conn: &C,
    community_id: i32,
    reported_user: &str,
) -> Result<u64, DbErr> {
    let reporters: Vec<String> = reports::Entity::find()
        .select_only()
        .column(reports::Column::ReporterUser)
        .distinct()
        .filter(reports::Column::CommunityId.eq(community_id))
        .filter(reports::Column::ReportedUser.eq(reported_user))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(reporters.len() as u64)
}

/// Ban `reported_user` if enough distinct members have reported them
///
/// Admins and moderators are never banned this way, and neither is anyone
/// already banned. The ban is committed before anyone is notified;
/// notification failures are logged and do not undo it.
pub async fn check_and_apply_auto_ban(
    db: &DatabaseConnection,
    notifier: &dyn LiveNotifier,
    community_id: i32,
    reported_user: &str,
) -> AutoBanOutcome {
    let threshold = crate::app_config::moderation().auto_ban_threshold;

    let report_count = match count_distinct_reporters(db, community_id, reported_user).await {
        Ok(count) => count,
        Err(err) => return check_failed(err),
    };

    if report_count < threshold {
        return AutoBanOutcome::not_banned();
    }

    let community = match find_community(db, community_id).await {
        Ok(Some(community)) => community,
        Ok(None) => return AutoBanOutcome::failed("Community not found".to_string()),
        Err(err) => return check_failed(err),
    };

    if community.is_banned(reported_user) {
        return AutoBanOutcome::skipped("User is already banned in this community");
    }

    if community.is_admin_or_moderator(reported_user) {
        return AutoBanOutcome::skipped("Cannot auto-ban community admins or moderators");
    }

    if let Err(err) = apply_ban(db, community_id, reported_user, report_count).await {
        return check_failed(err);
    }

    log::info!(
        "Auto-banned {} from community {} after reports from {} members",
        reported_user,
        community_id,
        report_count
    );

    notify_ban(db, notifier, &community, reported_user, report_count).await;

    AutoBanOutcome::banned(report_count)
}

fn check_failed(err: DbErr) -> AutoBanOutcome {
    log::error!("Error checking auto-ban: {}", err);
    AutoBanOutcome::failed(format!("Error checking auto-ban: {}", err))
}

async fn apply_ban(
    db: &DatabaseConnection,
    community_id: i32,
    username: &str,
    report_count: u64,
) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    ban_member(
        &txn,
        community_id,
        username,
        &format!("Automatically banned after reports from {} members", report_count),
    )
    .await?;
    txn.commit().await
}

/// Tell the banned member and the community staff, one send per audience
async fn notify_ban(
    db: &DatabaseConnection,
    notifier: &dyn LiveNotifier,
    community: &Community,
    username: &str,
    report_count: u64,
) {
    let now = Utc::now().naive_utc();

    let to_user = Notification {
        title: format!("Banned from {}", community.name),
        msg: format!(
            "You have been automatically banned from {} after being reported by {} members.",
            community.name, report_count
        ),
        sender: AUTO_MODERATOR.to_string(),
        date_time: now,
        context_id: Some(community.id),
        notification_type: NotificationType::Ban,
    };

    if let Err(err) = send_and_push(db, notifier, &[username.to_owned()], &to_user).await {
        log::warn!(
            "Failed to notify {} of their ban from community {}: {}",
            username,
            community.id,
            err
        );
    }

    let to_staff = Notification {
        title: format!("Member auto-banned in {}", community.name),
        msg: format!(
            "{} was automatically banned after being reported by {} members.",
            username, report_count
        ),
        sender: AUTO_MODERATOR.to_string(),
        date_time: now,
        context_id: Some(community.id),
        notification_type: NotificationType::Community,
    };

    if let Err(err) = send_and_push(db, notifier, &community.staff(), &to_staff).await {
        log::warn!(
            "Failed to notify staff of community {} about banning {}: {}",
            community.id,
            username,
            err
        );
    }
}
