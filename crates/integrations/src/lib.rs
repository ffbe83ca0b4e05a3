//! Outbound HTTP clients.
//!
//! [`StreamChatClient`] talks to the hosted chat service and [`KeywordClient`]
//! asks the keyword service for topic keywords used to enrich skills and
//! sessions.

mod error;
mod keywords;
mod stream;

pub use error::IntegrationError;
pub use keywords::KeywordClient;
pub use stream::{StreamChatClient, MESSAGING_CHANNEL};

pub type IntegrationResult<T> = Result<T, IntegrationError>;
