use actix::Actor;
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use fakeso::db::{get_db_pool, init_db, setup_schema};
use fakeso::notifications::LiveNotifier;
use fakeso::web::notifications_ws::NotificationServer;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();
    fakeso::app_config::init();

    let database = fakeso::app_config::database();
    let database_url = std::env::var("DATABASE_URL").unwrap_or(database.url);
    init_db(database_url).await;

    if database.setup_schema {
        setup_schema(get_db_pool())
            .await
            .context("Failed to create database schema")?;
    }

    // Start notification WebSocket server
    let notification_server = NotificationServer::new().start();
    let notifier: Arc<dyn LiveNotifier> = Arc::new(notification_server.clone());

    let server = fakeso::app_config::server();
    log::info!("Listening on {}:{}", server.host, server.port);

    HttpServer::new(move || {
        let notifier_data: Data<Arc<dyn LiveNotifier>> = Data::new(notifier.clone());

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(get_db_pool().clone()))
            .app_data(notifier_data)
            .app_data(Data::new(notification_server.clone()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(fakeso::web::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env is fine; the environment may already be set.
    if let Err(err) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", err);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
