//! Database pool and schema bootstrap

use crate::orm::{
    appeals, communities, community_bans, community_members, notifications, reports,
    user_notifications, users,
};
use once_cell::sync::OnceCell;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool globally.
/// Panics if the pool cannot be created or was already initialized.
pub async fn init_db(database_url: String) {
    let db = connect(&database_url, crate::app_config::database().max_connections)
        .await
        .expect("Failed to connect to the database");

    DB_POOL
        .set(db)
        .expect("Database pool already initialized");
}

/// Returns the global pool. Panics before `init_db`.
#[inline(always)]
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool not initialized")
}

/// Open a pool without registering it globally.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Create every table and index the service needs, skipping ones that exist.
///
/// Tables are created parents first so foreign keys resolve on Postgres.
pub async fn setup_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, communities::Entity).await?;
    create_table(db, community_members::Entity).await?;
    create_table(db, community_bans::Entity).await?;
    create_table(db, reports::Entity).await?;
    create_table(db, notifications::Entity).await?;
    create_table(db, user_notifications::Entity).await?;
    create_table(db, appeals::Entity).await?;

    for index in unique_indexes() {
        db.execute(db.get_database_backend().build(&index)).await?;
    }

    log::info!("Database schema ready");
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend)
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned();

    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Composite uniqueness the entities cannot express on their own.
fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        // One report per reporter per target per community
        Index::create()
            .if_not_exists()
            .name("idx_reports_reporter_target")
            .table(reports::Entity)
            .col(reports::Column::CommunityId)
            .col(reports::Column::ReporterUser)
            .col(reports::Column::ReportedUser)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_community_members_role")
            .table(community_members::Entity)
            .col(community_members::Column::CommunityId)
            .col(community_members::Column::Username)
            .col(community_members::Column::Role)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_community_bans_user")
            .table(community_bans::Entity)
            .col(community_bans::Column::CommunityId)
            .col(community_bans::Column::Username)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_user_notifications_pair")
            .table(user_notifications::Entity)
            .col(user_notifications::Column::UserId)
            .col(user_notifications::Column::NotificationId)
            .unique()
            .to_owned(),
    ]
}
