pub mod auth;
pub mod dashboard;
pub mod enrichment;
pub mod error;
pub mod exchange_requests;
pub mod exchange_sessions;
pub mod messages;
pub mod notifications;
pub mod sessions;
pub mod skills;
pub mod users;

pub use error::*;
