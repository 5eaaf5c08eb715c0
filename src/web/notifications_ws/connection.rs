//! One client's notification socket
//!
//! The session starts with the user's stored unread flags and keeps its own
//! copy up to date as notifications arrive, so the client never has to poll
//! `/api/notification/{username}` to learn whether something is new.

use super::message::{ClientFrame, Connect, Disconnect, NotificationPush};
use super::server::NotificationServer;
use crate::notifications::UnreadFlags;
use actix::*;
use actix_web_actors::ws;
use std::time::{Duration, Instant};

pub struct NotificationConnection {
    /// Assigned by the server once registered
    id: Option<usize>,
    username: String,
    unread: UnreadFlags,
    last_seen: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    server: Addr<NotificationServer>,
}

impl NotificationConnection {
    pub fn new(username: String, unread: UnreadFlags, server: Addr<NotificationServer>) -> Self {
        let config = crate::app_config::notifications();
        Self {
            id: None,
            username,
            unread,
            last_seen: Instant::now(),
            heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs),
            client_timeout: Duration::from_secs(config.client_timeout_secs),
            server,
        }
    }

    fn send(&self, frame: ClientFrame, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.text(frame.to_json());
    }

    fn leave(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        if let Some(id) = self.id.take() {
            self.server.do_send(Disconnect { id });
        }
        ctx.stop();
    }

    /// Ping on an interval and drop clients that stopped answering
    fn watch_liveness(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if act.last_seen.elapsed() > act.client_timeout {
                log::debug!("Notification socket of {} timed out", act.username);
                act.leave(ctx);
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for NotificationConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.watch_liveness(ctx);

        // Nothing is pushed until the server knows this session, then the
        // client gets its starting unread state.
        self.server
            .send(Connect {
                addr: ctx.address().recipient(),
                username: self.username.clone(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(id) => {
                        act.id = Some(id);
                        act.send(ClientFrame::Unread(act.unread), ctx);
                    }
                    Err(err) => {
                        log::warn!(
                            "Could not register notification socket of {}: {}",
                            act.username,
                            err
                        );
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let Some(id) = self.id.take() {
            self.server.do_send(Disconnect { id });
        }
        Running::Stop
    }
}

impl Handler<NotificationPush> for NotificationConnection {
    type Result = ();

    fn handle(&mut self, msg: NotificationPush, ctx: &mut Self::Context) {
        let notification = msg.0;
        self.send(ClientFrame::Notification(&notification), ctx);

        if self.unread.raise(notification.notification_type) {
            self.send(ClientFrame::Unread(self.unread), ctx);
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for NotificationConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                log::debug!("Notification socket of {} broke: {}", self.username, err);
                self.leave(ctx);
                return;
            }
        };

        self.last_seen = Instant::now();

        match msg {
            ws::Message::Ping(data) => ctx.pong(&data),
            ws::Message::Text(text) if text.trim() == "ping" => self.send(ClientFrame::Pong, ctx),
            ws::Message::Close(reason) => {
                ctx.close(reason);
                self.leave(ctx);
            }
            ws::Message::Continuation(_) => self.leave(ctx),
            // Push only: other client frames carry nothing we act on
            ws::Message::Pong(_) | ws::Message::Text(_) | ws::Message::Binary(_) | ws::Message::Nop => (),
        }
    }
}
