use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "SkillSwap API", description = "Peer-to-peer skill exchange backend"),
    paths(
        crate::routes::health::root,
        crate::routes::health::health_check,
        crate::routes::health::status,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::profile,
        crate::routes::auth::logout,
        crate::routes::auth::chat_user,
        crate::routes::users::list_users,
        crate::routes::users::search_users,
        crate::routes::users::get_profile,
        crate::routes::users::update_profile,
        crate::routes::users::suggested_users,
        crate::routes::users::get_user,
        crate::routes::users::user_stats,
        crate::routes::skills::create_skill,
        crate::routes::skills::list_skills,
        crate::routes::skills::search_skills,
        crate::routes::skills::get_skill,
        crate::routes::skills::update_skill,
        crate::routes::skills::delete_skill,
        crate::routes::sessions::create_session,
        crate::routes::sessions::list_sessions,
        crate::routes::sessions::public_sessions,
        crate::routes::sessions::search_sessions,
        crate::routes::sessions::upcoming_sessions,
        crate::routes::sessions::suggested_sessions,
        crate::routes::sessions::get_session,
        crate::routes::sessions::update_session,
        crate::routes::sessions::delete_session,
        crate::routes::sessions::join_session,
        crate::routes::sessions::leave_session,
        crate::routes::exchange_requests::create_request,
        crate::routes::exchange_requests::list_requests,
        crate::routes::exchange_requests::hosted_session_requests,
        crate::routes::exchange_requests::all_requests,
        crate::routes::exchange_requests::session_requests,
        crate::routes::exchange_requests::update_request_status,
        crate::routes::exchange_sessions::create_exchange_session,
        crate::routes::exchange_sessions::exchange_stats,
        crate::routes::exchange_sessions::list_exchange_sessions,
        crate::routes::exchange_sessions::public_exchange_sessions,
        crate::routes::exchange_sessions::search_exchange_sessions,
        crate::routes::exchange_sessions::upcoming_exchange_sessions,
        crate::routes::exchange_sessions::dashboard_exchange_sessions,
        crate::routes::exchange_sessions::exchange_sessions_by_skills,
        crate::routes::exchange_sessions::get_exchange_session,
        crate::routes::exchange_sessions::update_exchange_session,
        crate::routes::exchange_sessions::delete_exchange_session,
        crate::routes::notifications::get_notifications,
        crate::routes::notifications::get_unread_notifications,
        crate::routes::notifications::get_unread_count,
        crate::routes::notifications::mark_notification_read,
        crate::routes::notifications::mark_all_read,
        crate::routes::notifications::delete_notification,
        crate::routes::messages::list_conversations,
        crate::routes::messages::open_conversation,
        crate::routes::messages::get_messages,
        crate::routes::messages::create_message,
        crate::routes::messages::stream_token,
        crate::routes::messages::stream_channels,
        crate::routes::messages::create_stream_channel,
        crate::routes::messages::send_stream_message,
        crate::routes::dashboard::dashboard_data
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::pagination::PaginatedUsers,
            crate::pagination::PaginatedSkills,
            crate::pagination::PaginatedSessions,
            crate::pagination::PaginatedExchangeSessions,
            crate::pagination::PaginatedConversations,
            crate::pagination::PaginatedMessages,
            skillswap_database::User,
            skillswap_database::UserSummary,
            skillswap_database::UserStatus,
            skillswap_database::Skill,
            skillswap_database::SkillType,
            skillswap_database::CategoryCount,
            skillswap_database::Session,
            skillswap_database::SessionStatus,
            skillswap_database::ExchangeRequest,
            skillswap_database::ExchangeRequestStatus,
            skillswap_database::ExchangeSession,
            skillswap_database::ExchangeSessionStatus,
            skillswap_database::Notification,
            skillswap_database::Conversation,
            skillswap_database::Message,
            skillswap_database::MessageType,
            crate::routes::models::RootResponse,
            crate::routes::models::HealthResponse,
            crate::routes::models::StatusResponse,
            crate::routes::models::RegisterRequest,
            crate::routes::models::LoginRequest,
            crate::routes::models::LoginResponse,
            crate::routes::models::UserEnvelope,
            crate::routes::models::UpdateProfileRequest,
            crate::routes::models::CreateSkillRequest,
            crate::routes::models::UpdateSkillRequest,
            crate::routes::models::SkillWithOwner,
            crate::routes::models::CreateSessionRequest,
            crate::routes::models::UpdateSessionRequest,
            crate::routes::models::CreateExchangeRequestRequest,
            crate::routes::models::UpdateExchangeRequestStatus,
            crate::routes::models::CreateExchangeSessionRequest,
            crate::routes::models::UpdateExchangeSessionRequest,
            crate::routes::models::ExchangeStats,
            crate::routes::models::UnreadCountResponse,
            crate::routes::models::MarkAllReadResponse,
            crate::routes::models::CreateConversationRequest,
            crate::routes::models::SendMessageRequest,
            crate::routes::models::StreamTokenResponse,
            crate::routes::models::CreateChannelRequest,
            crate::routes::models::ChannelResponse,
            crate::routes::models::StreamMessageRequest,
            crate::services::users::UserStatsResponse,
            crate::services::dashboard::DashboardData,
            crate::services::dashboard::DashboardStats,
            crate::services::dashboard::KpiAnalytics,
            crate::services::dashboard::DailyActivity,
            crate::services::dashboard::RecentConnection,
            crate::services::dashboard::LearningProgress
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration, login and session management"),
        (name = "Users", description = "Member profiles and discovery"),
        (name = "Skills", description = "Skills members teach or want to learn"),
        (name = "Sessions", description = "Group learning sessions"),
        (name = "Exchange Requests", description = "Proposals to swap skills"),
        (name = "Exchange Sessions", description = "Scheduled one-to-one skill swaps"),
        (name = "Notifications", description = "User notifications"),
        (name = "Messages", description = "Direct conversations"),
        (name = "Chat", description = "Hosted chat pass-through"),
        (name = "Dashboard", description = "Aggregated activity for the caller")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Opaque".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_registers_bearer_scheme_and_routes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
        assert!(doc.paths.paths.contains_key("/sessions/{id}/join"));
        assert!(doc.paths.paths.contains_key("/dashboard/data"));
    }
}
