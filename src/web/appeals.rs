//! Ban appeal endpoints

use crate::appeals::{self, NewAppeal};
use crate::error::{describe_validation, AppealError};
use crate::notifications::LiveNotifier;
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_appeal).service(view_appeals);
}

/// POST /api/appeal/create
#[post("/api/appeal/create")]
async fn create_appeal(
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Arc<dyn LiveNotifier>>,
    body: web::Json<NewAppeal>,
) -> Result<HttpResponse, AppealError> {
    let appeal = body.into_inner();
    appeal
        .validate()
        .map_err(|e| AppealError::Invalid(describe_validation(&e)))?;

    let saved = appeals::file_appeal(db.get_ref(), notifier.get_ref().as_ref(), appeal).await?;

    log::info!(
        "{} appealed their ban in community {}",
        saved.username,
        saved.community_id
    );

    Ok(HttpResponse::Ok().json(saved))
}

/// GET /api/appeal/{communityId}
#[get("/api/appeal/{community_id}")]
async fn view_appeals(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppealError> {
    let appeals = appeals::get_appeals_by_community(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(appeals))
}
