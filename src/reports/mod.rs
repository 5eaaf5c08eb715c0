//! Report intake and moderator review
//!
//! A report is one member's complaint about another member of the same
//! community. Reports are never deleted; moderators move them out of
//! `pending` by reviewing or dismissing them.

pub mod auto_ban;

use crate::community::find_community;
use crate::error::ReportError;
use crate::notifications::LiveNotifier;
use crate::orm::reports::{self, ReportCategory, ReportStatus};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, Set, SqlErr};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use auto_ban::{check_and_apply_auto_ban, count_distinct_reporters, AutoBanOutcome};

/// A report as submitted by a member
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub community_id: i32,
    #[validate(length(min = 1, message = "reported user is required"))]
    pub reported_user: String,
    #[validate(length(min = 1, message = "reporter is required"))]
    pub reporter_user: String,
    pub reason: String,
    pub category: ReportCategory,
}

/// A stored report and what the auto-ban check made of it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReport {
    pub report: reports::Model,
    pub ban_applied: AutoBanOutcome,
}

/// Validate and store a report, then run the auto-ban check for its target
///
/// Nothing is written unless every check passes. The auto-ban check runs
/// after the report is stored and outside its write, so its outcome never
/// turns a stored report into an error.
pub async fn create_report(
    db: &DatabaseConnection,
    notifier: &dyn LiveNotifier,
    new_report: NewReport,
) -> Result<CreatedReport, ReportError> {
    if new_report.reporter_user == new_report.reported_user {
        return Err(ReportError::SelfReport);
    }

    let report = insert_report(db, &new_report).await?;

    log::info!(
        "Report {} filed by {} against {} in community {}",
        report.id,
        report.reporter_user,
        report.reported_user,
        report.community_id
    );

    let ban_applied =
        check_and_apply_auto_ban(db, notifier, report.community_id, &report.reported_user).await;

    Ok(CreatedReport {
        report,
        ban_applied,
    })
}

async fn insert_report<C: ConnectionTrait>(
    conn: &C,
    new_report: &NewReport,
) -> Result<reports::Model, ReportError> {
    let community = find_community(conn, new_report.community_id)
        .await
        .map_err(create_error)?
        .ok_or(ReportError::CommunityNotFound)?;

    if !community.is_participant(&new_report.reporter_user) {
        return Err(ReportError::ReporterNotMember);
    }
    if !community.is_participant(&new_report.reported_user) {
        return Err(ReportError::ReportedNotMember);
    }

    // Any earlier report counts, whatever its status
    let existing = reports::Entity::find()
        .filter(reports::Column::CommunityId.eq(community.id))
        .filter(reports::Column::ReporterUser.eq(new_report.reporter_user.as_str()))
        .filter(reports::Column::ReportedUser.eq(new_report.reported_user.as_str()))
        .one(conn)
        .await
        .map_err(create_error)?;

    if existing.is_some() {
        return Err(ReportError::Duplicate);
    }

    let reason = checked_reason(&new_report.reason)?;

    reports::ActiveModel {
        community_id: Set(community.id),
        reported_user: Set(new_report.reported_user.clone()),
        reporter_user: Set(new_report.reporter_user.clone()),
        reason: Set(reason.to_owned()),
        category: Set(new_report.category),
        status: Set(ReportStatus::Pending),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|err| match err.sql_err() {
        // Lost a race with an identical submission
        Some(SqlErr::UniqueConstraintViolation(_)) => ReportError::Duplicate,
        _ => create_error(err),
    })
}

/// Trimmed reason, rejected when empty or longer than the configured maximum
fn checked_reason(reason: &str) -> Result<&str, ReportError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ReportError::Invalid("A reason is required".to_string()));
    }

    let max_reason_length = crate::app_config::moderation().max_reason_length;
    if reason.chars().count() as u64 > max_reason_length {
        return Err(ReportError::Invalid(format!(
            "Reason must be at most {} characters",
            max_reason_length
        )));
    }

    Ok(reason)
}

fn create_error(err: DbErr) -> ReportError {
    log::error!("Error creating report: {}", err);
    ReportError::Create(err.to_string())
}

/// All reports filed against a user in a community, newest first
pub async fn get_reports_by_user<C: ConnectionTrait>(
    conn: &C,
    community_id: i32,
    username: &str,
) -> Result<Vec<reports::Model>, ReportError> {
    reports::Entity::find()
        .filter(reports::Column::CommunityId.eq(community_id))
        .filter(reports::Column::ReportedUser.eq(username))
        .order_by_desc(reports::Column::CreatedAt)
        .order_by_desc(reports::Column::Id)
        .all(conn)
        .await
        .map_err(|err| ReportError::Fetch(err.to_string()))
}

/// Reports in a community that no moderator has looked at yet, newest first
pub async fn get_pending_reports_by_community<C: ConnectionTrait>(
    conn: &C,
    community_id: i32,
) -> Result<Vec<reports::Model>, ReportError> {
    reports::Entity::find()
        .filter(reports::Column::CommunityId.eq(community_id))
        .filter(reports::Column::Status.eq(ReportStatus::Pending))
        .order_by_desc(reports::Column::CreatedAt)
        .order_by_desc(reports::Column::Id)
        .all(conn)
        .await
        .map_err(|err| ReportError::Fetch(err.to_string()))
}

/// Record a moderator's decision on a report
pub async fn update_report_status<C: ConnectionTrait>(
    conn: &C,
    report_id: i32,
    status: ReportStatus,
    reviewed_by: &str,
) -> Result<reports::Model, ReportError> {
    let report = reports::Entity::find_by_id(report_id)
        .one(conn)
        .await
        .map_err(|err| ReportError::Update(err.to_string()))?
        .ok_or(ReportError::ReportNotFound)?;

    let mut active_report: reports::ActiveModel = report.into();
    active_report.status = Set(status);
    active_report.reviewed_by = Set(Some(reviewed_by.to_owned()));
    active_report.reviewed_at = Set(Some(Utc::now().naive_utc()));

    active_report
        .update(conn)
        .await
        .map_err(|err| ReportError::Update(err.to_string()))
}
