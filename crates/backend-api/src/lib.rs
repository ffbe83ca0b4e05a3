mod error;
mod state;
mod util;

pub mod docs;
pub mod pagination;
pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorResponse};
pub use state::{ApiSettings, AppState};

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use docs::ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings().cors_allowed_origins);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/status", get(routes::health::status))
        // Auth routes
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/profile", get(routes::auth::profile))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/user/:user_id", get(routes::auth::chat_user))
        // User routes
        .route("/users", get(routes::users::list_users))
        .route("/users/search", get(routes::users::search_users))
        .route(
            "/users/profile",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route("/users/suggested", get(routes::users::suggested_users))
        .route("/users/:id", get(routes::users::get_user))
        .route("/users/:id/stats", get(routes::users::user_stats))
        // Skill routes
        .route(
            "/skills",
            get(routes::skills::list_skills).post(routes::skills::create_skill),
        )
        .route("/skills/search", get(routes::skills::search_skills))
        .route(
            "/skills/:id",
            get(routes::skills::get_skill)
                .put(routes::skills::update_skill)
                .delete(routes::skills::delete_skill),
        )
        // Session routes
        .route(
            "/sessions",
            get(routes::sessions::list_sessions).post(routes::sessions::create_session),
        )
        .route("/sessions/public", get(routes::sessions::public_sessions))
        .route("/sessions/search", get(routes::sessions::search_sessions))
        .route("/sessions/upcoming", get(routes::sessions::upcoming_sessions))
        .route("/sessions/suggested", get(routes::sessions::suggested_sessions))
        .route(
            "/sessions/:id",
            get(routes::sessions::get_session)
                .put(routes::sessions::update_session)
                .delete(routes::sessions::delete_session),
        )
        .route("/sessions/:id/join", post(routes::sessions::join_session))
        .route("/sessions/:id/leave", post(routes::sessions::leave_session))
        // Exchange request routes
        .route(
            "/exchange-requests",
            get(routes::exchange_requests::list_requests)
                .post(routes::exchange_requests::create_request),
        )
        .route(
            "/exchange-requests/hosted-sessions",
            get(routes::exchange_requests::hosted_session_requests),
        )
        .route(
            "/exchange-requests/all",
            get(routes::exchange_requests::all_requests),
        )
        .route(
            "/exchange-requests/session/:session_id",
            get(routes::exchange_requests::session_requests),
        )
        .route(
            "/exchange-requests/:id",
            patch(routes::exchange_requests::update_request_status),
        )
        // Exchange session routes
        .route(
            "/exchange-sessions",
            get(routes::exchange_sessions::list_exchange_sessions)
                .post(routes::exchange_sessions::create_exchange_session),
        )
        .route(
            "/exchange-sessions/stats",
            get(routes::exchange_sessions::exchange_stats),
        )
        .route(
            "/exchange-sessions/public",
            get(routes::exchange_sessions::public_exchange_sessions),
        )
        .route(
            "/exchange-sessions/search",
            get(routes::exchange_sessions::search_exchange_sessions),
        )
        .route(
            "/exchange-sessions/upcoming",
            get(routes::exchange_sessions::upcoming_exchange_sessions),
        )
        .route(
            "/exchange-sessions/upcoming-dashboard",
            get(routes::exchange_sessions::dashboard_exchange_sessions),
        )
        .route(
            "/exchange-sessions/by-skills/:skill_id/:requested_skill_id",
            get(routes::exchange_sessions::exchange_sessions_by_skills),
        )
        .route(
            "/exchange-sessions/:id",
            get(routes::exchange_sessions::get_exchange_session)
                .put(routes::exchange_sessions::update_exchange_session)
                .delete(routes::exchange_sessions::delete_exchange_session),
        )
        // Notification routes
        .route(
            "/notifications",
            get(routes::notifications::get_notifications),
        )
        .route(
            "/notifications/unread",
            get(routes::notifications::get_unread_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(routes::notifications::get_unread_count),
        )
        .route(
            "/notifications/mark-all-read",
            patch(routes::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id/read",
            patch(routes::notifications::mark_notification_read),
        )
        .route(
            "/notifications/:id",
            axum::routing::delete(routes::notifications::delete_notification),
        )
        // Message routes
        .route(
            "/messages/conversations",
            get(routes::messages::list_conversations).post(routes::messages::open_conversation),
        )
        .route(
            "/messages/conversations/:id/messages",
            get(routes::messages::get_messages).post(routes::messages::create_message),
        )
        .route("/messages/stream/token", get(routes::messages::stream_token))
        .route(
            "/messages/stream/channels",
            get(routes::messages::stream_channels).post(routes::messages::create_stream_channel),
        )
        .route(
            "/messages/stream/channels/:channel_id/messages",
            post(routes::messages::send_stream_message),
        )
        // Dashboard
        .route("/dashboard/data", get(routes::dashboard::dashboard_data))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%origin, %error, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
