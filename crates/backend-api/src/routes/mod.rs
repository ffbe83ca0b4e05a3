pub mod auth;
pub mod dashboard;
pub mod exchange_requests;
pub mod exchange_sessions;
pub mod health;
pub mod messages;
pub mod models;
pub mod notifications;
pub mod sessions;
pub mod skills;
pub mod users;
