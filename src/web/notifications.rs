//! Notification read-side endpoints

use crate::error::NotificationError;
use crate::notifications::{self, NotificationType};
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(clear_unread).service(view_notifications);
}

#[derive(Deserialize)]
struct NotificationQuery {
    limit: Option<u64>,
}

/// GET /api/notification/{username}
#[get("/api/notification/{username}")]
async fn view_notifications(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse, NotificationError> {
    let limit = query
        .limit
        .unwrap_or_else(|| crate::app_config::notifications().list_limit);

    let notifications =
        notifications::get_user_notifications(db.get_ref(), &path.into_inner(), limit).await?;

    Ok(HttpResponse::Ok().json(notifications))
}

#[derive(Deserialize)]
struct ClearRequest {
    username: String,
    #[serde(rename = "type")]
    notification_type: NotificationType,
}

/// POST /api/notification/clear
#[post("/api/notification/clear")]
async fn clear_unread(
    db: web::Data<DatabaseConnection>,
    body: web::Json<ClearRequest>,
) -> Result<HttpResponse, NotificationError> {
    let flags =
        notifications::clear_unread(db.get_ref(), &body.username, body.notification_type).await?;
    Ok(HttpResponse::Ok().json(flags))
}
