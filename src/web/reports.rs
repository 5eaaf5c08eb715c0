//! Report submission and moderation endpoints

use crate::error::{describe_validation, ReportError};
use crate::notifications::LiveNotifier;
use crate::orm::reports::ReportStatus;
use crate::reports::{self, NewReport};
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_report)
        .service(get_reports_by_user)
        .service(get_pending_reports)
        .service(update_report_status);
}

/// POST /api/report/create
#[post("/api/report/create")]
async fn create_report(
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Arc<dyn LiveNotifier>>,
    body: web::Json<NewReport>,
) -> Result<HttpResponse, ReportError> {
    let new_report = body.into_inner();
    new_report
        .validate()
        .map_err(|e| ReportError::Invalid(describe_validation(&e)))?;

    let created = reports::create_report(db.get_ref(), notifier.get_ref().as_ref(), new_report)
        .await?;

    Ok(HttpResponse::Ok().json(created))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ReportsByUserRequest {
    community_id: i32,
    #[validate(length(min = 1, message = "username is required"))]
    username: String,
}

/// POST /api/report/getByUser
#[post("/api/report/getByUser")]
async fn get_reports_by_user(
    db: web::Data<DatabaseConnection>,
    body: web::Json<ReportsByUserRequest>,
) -> Result<HttpResponse, ReportError> {
    body.validate()
        .map_err(|e| ReportError::Invalid(describe_validation(&e)))?;

    let reports = reports::get_reports_by_user(db.get_ref(), body.community_id, &body.username)
        .await?;

    Ok(HttpResponse::Ok().json(reports))
}

/// GET /api/report/pending/{communityId}
#[get("/api/report/pending/{community_id}")]
async fn get_pending_reports(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ReportError> {
    let reports = reports::get_pending_reports_by_community(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reports))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest {
    report_id: i32,
    status: ReportStatus,
    #[validate(length(min = 1, message = "reviewer is required"))]
    reviewed_by: String,
}

/// POST /api/report/updateStatus
#[post("/api/report/updateStatus")]
async fn update_report_status(
    db: web::Data<DatabaseConnection>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ReportError> {
    body.validate()
        .map_err(|e| ReportError::Invalid(describe_validation(&e)))?;

    let report =
        reports::update_report_status(db.get_ref(), body.report_id, body.status, &body.reviewed_by)
            .await?;

    log::info!(
        "Report {} marked {:?} by {}",
        report.id,
        report.status,
        body.reviewed_by
    );

    Ok(HttpResponse::Ok().json(report))
}
