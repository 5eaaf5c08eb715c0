pub mod appeals;
pub mod communities;
pub mod community_bans;
pub mod community_members;
pub mod notifications;
pub mod reports;
pub mod user_notifications;
pub mod users;
