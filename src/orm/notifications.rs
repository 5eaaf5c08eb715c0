//! SeaORM Entity for notifications table
//!
//! Rows are written once by the dispatcher and never updated.

use crate::notifications::NotificationType;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "notifications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub msg: String,
    pub sender: String,
    pub date_time: DateTime,
    /// Community, report or message the notification is about
    pub context_id: Option<i32>,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub type_: NotificationType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_notifications::Entity")]
    UserNotifications,
}

impl Related<super::user_notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserNotifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
