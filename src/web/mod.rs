pub mod appeals;
pub mod notifications;
pub mod notifications_ws;
pub mod reports;

use crate::error::ErrorBody;
use actix_web::{error::InternalError, web, HttpResponse};

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut web::ServiceConfig) {
    conf.app_data(json_config()).app_data(path_config());

    appeals::configure(conf);
    notifications::configure(conf);
    notifications_ws::configure(conf);
    reports::configure(conf);
}

/// Malformed bodies get the same `{"error": ...}` shape as domain errors
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorBody {
            error: format!("Invalid request body: {}", err),
        });
        InternalError::from_response(err, response).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorBody {
            error: format!("Invalid path: {}", err),
        });
        InternalError::from_response(err, response).into()
    })
}
