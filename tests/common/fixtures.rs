//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::Utc;
use fakeso::community::{add_member, create_community};
use fakeso::notifications::LiveNotifier;
use fakeso::orm::community_members::MemberRole;
use fakeso::orm::reports::ReportCategory;
use fakeso::orm::{notifications, users};
use fakeso::reports::NewReport;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};
use std::collections::HashSet;
use std::sync::Mutex;

pub const ADMIN: &str = "admin123";
pub const MODERATOR: &str = "mod1";
pub const REPORTERS: [&str; 5] = ["reporter1", "reporter2", "reporter3", "reporter4", "reporter5"];

/// Create a user with both unread flags lowered
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        username: Set(username.to_string()),
        community_notifs: Set(false),
        message_notifs: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// "Test Community" run by admin123 with moderator mod1
///
/// Participants are the admin, mod1, user1, user2 and reporter1..reporter5.
/// Every one of them also exists as a user. Returns the community id.
pub async fn create_test_community(db: &DatabaseConnection) -> Result<i32, DbErr> {
    create_test_user(db, ADMIN).await?;
    let community = create_community(db, "Test Community", "A community for tests", ADMIN).await?;

    create_test_user(db, MODERATOR).await?;
    add_member(db, community.id, MODERATOR, MemberRole::Moderator).await?;
    add_member(db, community.id, MODERATOR, MemberRole::Participant).await?;

    for username in ["user1", "user2"].into_iter().chain(REPORTERS) {
        create_test_user(db, username).await?;
        add_member(db, community.id, username, MemberRole::Participant).await?;
    }

    Ok(community.id)
}

pub fn new_report(community_id: i32, reporter: &str, reported: &str) -> NewReport {
    NewReport {
        community_id,
        reported_user: reported.to_string(),
        reporter_user: reporter.to_string(),
        reason: "Posting spam links".to_string(),
        category: ReportCategory::Spam,
    }
}

/// Records pushes for users marked online and drops the rest
#[derive(Default)]
pub struct RecordingNotifier {
    online: HashSet<String>,
    pushed: Mutex<Vec<(String, notifications::Model)>>,
}

impl RecordingNotifier {
    pub fn with_online(users: &[&str]) -> Self {
        Self {
            online: users.iter().map(|u| u.to_string()).collect(),
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub fn pushed(&self) -> Vec<(String, notifications::Model)> {
        self.pushed.lock().unwrap().clone()
    }
}

impl LiveNotifier for RecordingNotifier {
    fn push(&self, username: &str, notification: &notifications::Model) {
        if self.online.contains(username) {
            self.pushed
                .lock()
                .unwrap()
                .push((username.to_string(), notification.clone()));
        }
    }
}
