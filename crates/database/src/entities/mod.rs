//! Domain entities for the database layer

use chrono::{SecondsFormat, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;

use crate::types::{DatabaseError, DatabaseResult};

pub mod conversation;
pub mod exchange_request;
pub mod exchange_session;
pub mod notification;
pub mod session;
pub mod skill;
pub mod user;

pub use conversation::{Conversation, Message, MessageType};
pub use exchange_request::{
    ExchangeRequest, ExchangeRequestStatus, NewExchangeRequest,
};
pub use exchange_session::{
    ExchangeSession, ExchangeSessionStatus, ExchangeSessionUpdate, NewExchangeSession,
};
pub use notification::{NewNotification, Notification};
pub use session::{NewSession, Session, SessionStatus, SessionUpdate};
pub use skill::{CategoryCount, NewSkill, Skill, SkillType, SkillUpdate};
pub use user::{NewUser, User, UserStats, UserStatus, UserSummary, UserUpdate, DEFAULT_AVATAR_URL};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Fresh opaque identifier for a new row.
pub fn new_id() -> String {
    CUID.create_id()
}

/// Current UTC time in the RFC 3339 form stored in every timestamp column.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn encode_list(values: &[String]) -> DatabaseResult<String> {
    serde_json::to_string(values).map_err(|error| DatabaseError::corrupt("list", error))
}

pub(crate) fn decode_list(column: &'static str, raw: &str) -> DatabaseResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|error| DatabaseError::corrupt(column, error))
}

/// Implements `as_str`, `FromStr` and `Display` for a lowercase string-backed enum.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::types::InvalidEnumValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::types::InvalidEnumValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;

pub(crate) fn parse_enum<T>(column: &'static str, raw: &str) -> DatabaseResult<T>
where
    T: std::str::FromStr<Err = crate::types::InvalidEnumValue>,
{
    raw.parse::<T>()
        .map_err(|error| DatabaseError::corrupt(column, error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_columns_round_trip_through_json() {
        let encoded = encode_list(&["rust".to_string(), "axum".to_string()]).unwrap();
        assert_eq!(encoded, r#"["rust","axum"]"#);
        assert_eq!(decode_list("agenda", &encoded).unwrap(), vec!["rust", "axum"]);
    }

    #[test]
    fn decode_list_reports_the_corrupt_column() {
        let error = decode_list("metadata", "not json").unwrap_err();
        assert!(error.to_string().contains("metadata"));
    }

    #[test]
    fn timestamps_sort_lexicographically() {
        let first = timestamp_now();
        let second = timestamp_now();
        assert!(first <= second);
        assert!(first.ends_with('Z'));
    }
}
