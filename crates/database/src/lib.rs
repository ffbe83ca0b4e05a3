//! SkillSwap Database Crate
//!
//! Connection management, migrations, entities and repositories for the
//! SkillSwap backend.

use sqlx::SqlitePool;
use skillswap_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{
    ConversationRepository, ExchangeRequestRepository, ExchangeSessionRepository, JoinOutcome,
    NotificationRepository, SearchPage, SearchTerm, SessionRepository, SkillRepository,
    UserRepository,
};

pub use entities::{
    new_id, timestamp_now, CategoryCount, Conversation, ExchangeRequest, ExchangeRequestStatus,
    ExchangeSession, ExchangeSessionStatus, ExchangeSessionUpdate, Message, MessageType,
    NewExchangeRequest, NewExchangeSession, NewNotification, NewSession, NewSkill, NewUser,
    Notification, Session, SessionStatus, SessionUpdate, Skill, SkillType, SkillUpdate, User,
    UserStats, UserStatus, UserSummary, UserUpdate, DEFAULT_AVATAR_URL,
};

pub use types::{DatabaseError, DatabaseResult, InvalidEnumValue};

/// Connect to the configured database and apply pending migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
