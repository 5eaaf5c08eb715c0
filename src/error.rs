//! Domain errors and their HTTP mapping
//!
//! Business outcomes (self-report, non-member, duplicate, not found) are
//! returned as typed values. Infrastructure failures carry the underlying
//! message and always map to a 500.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn json_error(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("You cannot report yourself")]
    SelfReport,
    #[error("Community not found")]
    CommunityNotFound,
    #[error("You must be a member of this community to report users")]
    ReporterNotMember,
    #[error("You can only report members of this community")]
    ReportedNotMember,
    #[error("You have already reported this user in this community")]
    Duplicate,
    #[error("Report not found")]
    ReportNotFound,
    #[error("{0}")]
    Invalid(String),
    #[error("Error creating report: {0}")]
    Create(String),
    #[error("Error fetching reports: {0}")]
    Fetch(String),
    #[error("Error updating report: {0}")]
    Update(String),
}

impl ResponseError for ReportError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::SelfReport | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::ReporterNotMember | Self::ReportedNotMember => StatusCode::FORBIDDEN,
            Self::CommunityNotFound | Self::ReportNotFound => StatusCode::NOT_FOUND,
            Self::Duplicate => StatusCode::CONFLICT,
            Self::Create(_) | Self::Fetch(_) | Self::Update(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }
}

/// Failure of one dispatcher step
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid Notification")]
    InvalidNotification,
    #[error("Update failed")]
    UpdateFailed,
    #[error("User not found")]
    UnknownUser,
    #[error("{0}")]
    Database(#[from] DbErr),
}

/// Failure of `send_notification`, tagged with the step that broke
#[derive(Debug, Error)]
pub enum SendNotificationError {
    #[error("1: {0}")]
    Save(NotificationError),
    #[error("2: {0}")]
    Deliver(NotificationError),
    #[error("{0}")]
    Transaction(#[from] DbErr),
}

impl ResponseError for NotificationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidNotification => StatusCode::BAD_REQUEST,
            Self::UpdateFailed | Self::UnknownUser => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppealError {
    #[error("Community not found")]
    CommunityNotFound,
    #[error("Only banned members can appeal")]
    NotBanned,
    #[error("{0}")]
    Invalid(String),
    #[error("Failed to notify moderators: {0}")]
    Notify(#[from] SendNotificationError),
    #[error("Failed to create appeal: {0}")]
    Database(#[from] DbErr),
}

impl ResponseError for AppealError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CommunityNotFound => StatusCode::NOT_FOUND,
            Self::NotBanned => StatusCode::FORBIDDEN,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Notify(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }
}

/// Flatten `validator` output into one readable line
pub fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();
    fields.sort();
    format!("Invalid request: {}", fields.join("; "))
}
