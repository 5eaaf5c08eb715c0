//! Fake Stack Overflow community moderation: member reports, automatic bans
//! and the notifications they raise.

pub mod app_config;
pub mod appeals;
pub mod community;
pub mod db;
pub mod error;
pub mod notifications;
pub mod orm;
pub mod reports;
pub mod web;
