//! Notification type definitions

use crate::orm::users;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[sea_orm(string_value = "community")]
    Community, // Activity in a community you belong to or moderate
    #[sea_orm(string_value = "message")]
    Message, // New direct message
    #[sea_orm(string_value = "ban")]
    Ban, // You were banned from a community
    #[sea_orm(string_value = "other")]
    Other,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Message => "message",
            Self::Ban => "ban",
            Self::Other => "other",
        }
    }

    /// The per-user unread flag raised when this type is delivered, if any.
    pub fn unread_flag(&self) -> Option<users::Column> {
        match self {
            Self::Community => Some(users::Column::CommunityNotifs),
            Self::Message => Some(users::Column::MessageNotifs),
            Self::Ban | Self::Other => None,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}
