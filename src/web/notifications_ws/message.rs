//! Message types for the notification WebSocket system

use crate::notifications::{NotificationType, UnreadFlags};
use crate::orm::notifications;
use actix::prelude::*;
use serde::Serialize;

/// New notification WebSocket connection
pub struct Connect {
    /// Channel to send messages back to this connection
    pub addr: Recipient<NotificationPush>,
    pub username: String,
}

impl Message for Connect {
    /// Returns connection ID
    type Result = usize;
}

/// Disconnect message
pub struct Disconnect {
    /// Connection ID
    pub id: usize,
}

impl Message for Disconnect {
    type Result = ();
}

/// Push a notification to every session of one user
#[derive(Clone)]
pub struct BroadcastNotification {
    pub username: String,
    pub notification: NotificationData,
}

impl Message for BroadcastNotification {
    type Result = ();
}

/// Notification data to send to client
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub id: i32,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub msg: String,
    pub sender: String,
    pub context_id: Option<i32>,
    pub date_time: String,
}

impl From<&notifications::Model> for NotificationData {
    fn from(model: &notifications::Model) -> Self {
        Self {
            id: model.id,
            notification_type: model.type_,
            title: model.title.clone(),
            msg: model.msg.clone(),
            sender: model.sender.clone(),
            context_id: model.context_id,
            date_time: model.date_time.and_utc().to_rfc3339(),
        }
    }
}

/// Server -> connection push of one stored notification
pub struct NotificationPush(pub NotificationData);

impl Message for NotificationPush {
    type Result = ();
}

/// Get count of open connections
pub struct GetConnectionCount;

impl Message for GetConnectionCount {
    type Result = usize;
}

/// Number of open connections for one user
pub struct GetUserConnectionCount(pub String);

impl Message for GetUserConnectionCount {
    type Result = usize;
}

/// Frames written to the client socket
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClientFrame<'a> {
    Notification(&'a NotificationData),
    /// Current unread state, sent on connect and whenever it changes
    Unread(UnreadFlags),
    Pong,
}

impl ClientFrame<'_> {
    pub fn to_json(&self) -> String {
        // Plain data with string keys; serializing cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
