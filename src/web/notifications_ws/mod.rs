//! Real-time notification WebSocket system
//!
//! - `NotificationServer` maps usernames to their open sessions
//! - `NotificationConnection` handles one WebSocket session
//! - `Addr<NotificationServer>` implements `LiveNotifier`, so the dispatcher
//!   pushes every stored notification to whichever recipients are online
//!
//! Clients connect to `/api/notification/ws/{username}` and receive
//! `{"type":"unread","data":{...}}` on connect, then
//! `{"type":"notification","data":{...}}` per notification, followed by a
//! fresh `unread` frame whenever a flag goes up. Sending `ping` as text
//! answers `{"type":"pong"}`.

pub mod connection;
pub mod message;
pub mod server;

use crate::error::NotificationError;
use crate::notifications::unread_flags;
use actix::Addr;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use connection::NotificationConnection;
use sea_orm::DatabaseConnection;

pub use message::{BroadcastNotification, NotificationData};
pub use server::NotificationServer;

pub fn configure(conf: &mut web::ServiceConfig) {
    conf.service(notifications_ws);
}

/// WebSocket endpoint for real-time notifications
///
/// Only existing users may connect; their stored unread flags seed the
/// session.
#[get("/api/notification/ws/{username}")]
pub async fn notifications_ws(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
    server: web::Data<Addr<NotificationServer>>,
) -> Result<HttpResponse, Error> {
    let username = path.into_inner();

    let unread = unread_flags(db.get_ref(), &username)
        .await
        .map_err(NotificationError::from)?
        .ok_or(NotificationError::UnknownUser)?;

    log::debug!("User {} connecting to notification WebSocket", username);

    let connection = NotificationConnection::new(username, unread, server.get_ref().clone());
    ws::start(connection, &req, stream)
}
