//! NotificationServer actor for managing notification WebSocket connections
//!
//! This actor maps usernames to their open connections and forwards
//! notifications to whichever of them are connected.

use super::message::{
    BroadcastNotification, Connect, Disconnect, GetConnectionCount, GetUserConnectionCount,
    NotificationData, NotificationPush,
};
use crate::notifications::LiveNotifier;
use crate::orm::notifications;
use actix::prelude::*;
use std::collections::HashMap;

/// NotificationServer manages WebSocket connections for real-time notifications
pub struct NotificationServer {
    next_id: usize,
    /// Connection ID -> recipient
    connections: HashMap<usize, Recipient<NotificationPush>>,
    /// Username -> connection IDs (a user may have several tabs open)
    user_connections: HashMap<String, Vec<usize>>,
}

impl NotificationServer {
    pub fn new() -> Self {
        log::info!("NotificationServer starting up.");
        Self {
            next_id: 0,
            connections: HashMap::new(),
            user_connections: HashMap::new(),
        }
    }

    /// Send to all connections of a user. Users without any are skipped.
    fn send_to_user(&self, username: &str, notification: &NotificationData) -> usize {
        let Some(conn_ids) = self.user_connections.get(username) else {
            return 0;
        };

        let mut sent = 0;
        for conn_id in conn_ids {
            if let Some(recipient) = self.connections.get(conn_id) {
                recipient.do_send(NotificationPush(notification.clone()));
                sent += 1;
            }
        }
        sent
    }
}

impl Default for NotificationServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for NotificationServer {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(64);
        log::info!("NotificationServer started");
    }
}

impl Handler<Connect> for NotificationServer {
    type Result = usize;

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> Self::Result {
        let conn_id = self.next_id;
        self.next_id += 1;

        self.connections.insert(conn_id, msg.addr);
        self.user_connections
            .entry(msg.username.clone())
            .or_default()
            .push(conn_id);

        log::debug!(
            "User {} connected with connection ID {} (total connections: {})",
            msg.username,
            conn_id,
            self.connections.len()
        );

        conn_id
    }
}

impl Handler<Disconnect> for NotificationServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        self.connections.remove(&msg.id);

        for conn_ids in self.user_connections.values_mut() {
            conn_ids.retain(|&id| id != msg.id);
        }
        self.user_connections.retain(|_, v| !v.is_empty());

        log::debug!(
            "Connection {} disconnected (total connections: {})",
            msg.id,
            self.connections.len()
        );
    }
}

impl Handler<BroadcastNotification> for NotificationServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastNotification, _: &mut Context<Self>) {
        let sent = self.send_to_user(&msg.username, &msg.notification);
        if sent > 0 {
            log::debug!("Pushed notification to {} ({} sessions)", msg.username, sent);
        }
    }
}

impl Handler<GetConnectionCount> for NotificationServer {
    type Result = usize;

    fn handle(&mut self, _: GetConnectionCount, _: &mut Context<Self>) -> Self::Result {
        self.connections.len()
    }
}

impl Handler<GetUserConnectionCount> for NotificationServer {
    type Result = usize;

    fn handle(&mut self, msg: GetUserConnectionCount, _: &mut Context<Self>) -> Self::Result {
        self.user_connections
            .get(&msg.0)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Supervised for NotificationServer {
    fn restarting(&mut self, _: &mut Context<NotificationServer>) {
        log::warn!("Restarting the NotificationServer.");
    }
}

impl LiveNotifier for Addr<NotificationServer> {
    fn push(&self, username: &str, notification: &notifications::Model) {
        self.do_send(BroadcastNotification {
            username: username.to_owned(),
            notification: notification.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationType;
    use std::sync::{Arc, Mutex};

    /// Stands in for a websocket session and records what it is sent
    struct Sink(Arc<Mutex<Vec<NotificationData>>>);

    impl Actor for Sink {
        type Context = Context<Self>;
    }

    impl Handler<NotificationPush> for Sink {
        type Result = ();

        fn handle(&mut self, msg: NotificationPush, _: &mut Context<Self>) {
            self.0.lock().unwrap().push(msg.0);
        }
    }

    fn stored(id: i32) -> notifications::Model {
        notifications::Model {
            id,
            title: "Banned from Test Community".to_string(),
            msg: "You have been banned".to_string(),
            sender: "system".to_string(),
            date_time: chrono::Utc::now().naive_utc(),
            context_id: Some(1),
            type_: NotificationType::Ban,
        }
    }

    #[actix_rt::test]
    async fn test_push_reaches_connected_user_only() {
        let server = NotificationServer::new().start();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Sink(received.clone()).start();

        let conn_id = server
            .send(Connect {
                addr: sink.recipient(),
                username: "user1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(conn_id, 0);
        assert_eq!(server.send(GetConnectionCount).await.unwrap(), 1);
        assert_eq!(
            server
                .send(GetUserConnectionCount("user1".to_string()))
                .await
                .unwrap(),
            1
        );

        // Offline user: silently dropped
        server.push("user2", &stored(1));
        server.push("user1", &stored(2));

        // Round-trip through the mailbox so the pushes above are handled
        server.send(GetConnectionCount).await.unwrap();
        actix_rt::time::sleep(std::time::Duration::from_millis(20)).await;

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, 2);
        assert_eq!(received[0].notification_type, NotificationType::Ban);
    }

    #[actix_rt::test]
    async fn test_disconnect_forgets_user() {
        let server = NotificationServer::new().start();
        let sink = Sink(Arc::new(Mutex::new(Vec::new()))).start();

        let conn_id = server
            .send(Connect {
                addr: sink.recipient(),
                username: "user1".to_string(),
            })
            .await
            .unwrap();
        server.send(Disconnect { id: conn_id }).await.unwrap();

        assert_eq!(server.send(GetConnectionCount).await.unwrap(), 0);
        assert_eq!(
            server
                .send(GetUserConnectionCount("user1".to_string()))
                .await
                .unwrap(),
            0
        );
    }
}
