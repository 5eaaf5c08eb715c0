//! Real-time delivery seam
//!
//! Stored notifications are additionally pushed to any open session of the
//! recipient. Delivery is fire-and-forget: a user without a session simply
//! gets nothing pushed.

use crate::orm::notifications;

/// Pushes stored notifications to connected users
pub trait LiveNotifier: Send + Sync {
    fn push(&self, username: &str, notification: &notifications::Model);
}

/// Discards every push. Used where no websocket server runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl LiveNotifier for NullNotifier {
    fn push(&self, _username: &str, _notification: &notifications::Model) {}
}
