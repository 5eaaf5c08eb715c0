//! Test database setup
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Fresh in-memory SQLite database with the full schema
///
/// The pool holds a single connection, since every SQLite memory connection
/// is its own database. Code under test must therefore never touch the pool
/// while it holds an open transaction.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = fakeso::db::connect("sqlite::memory:", 1).await?;
    fakeso::db::setup_schema(&db).await?;
    Ok(db)
}
