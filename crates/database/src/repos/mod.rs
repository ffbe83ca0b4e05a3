//! Database repository implementations

pub mod conversation_repository;
pub mod exchange_request_repository;
pub mod exchange_session_repository;
pub mod notification_repository;
pub mod search;
pub mod session_repository;
pub mod skill_repository;
pub mod user_repository;

pub use conversation_repository::ConversationRepository;
pub use exchange_request_repository::ExchangeRequestRepository;
pub use exchange_session_repository::ExchangeSessionRepository;
pub use notification_repository::NotificationRepository;
pub use search::{SearchPage, SearchTerm};
pub use session_repository::{JoinOutcome, SessionRepository};
pub use skill_repository::SkillRepository;
pub use user_repository::UserRepository;
