use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use chrono::{Days, Duration, Local, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use skillswap_backend_api::build_router;
use skillswap_backend_runtime::{jobs, BackendServices};
use skillswap_config::AppConfig;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    pool: SqlitePool,
    _db_dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("skillswap-test.db");
        let db_url = format!("sqlite://{}", db_path.to_string_lossy());

        let mut config = AppConfig::default();
        config.database.url = db_url;
        config.database.max_connections = 5;
        config.keywords.enabled = false;
        config.stream.api_key = None;
        config.stream.api_secret = None;

        let services = BackendServices::initialise(&config)
            .await
            .expect("initialise backend services");
        let router = build_router(services.app_state());

        Self {
            router,
            pool: services.db_pool.clone(),
            _db_dir: db_dir,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let app = self.router.clone();
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            let bytes = serde_json::to_vec(&json_body).expect("serialize request body");
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(bytes)
        } else {
            Body::empty()
        };

        let response = app
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("dispatch request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect response body")
            .to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap_or_default();
        let json = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        TestResponse { status, text, json }
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Registers and logs in, returning `(user_id, token)`.
    async fn member(&self, name: &str) -> (String, String) {
        let email = format!("{}@example.com", name.to_lowercase());
        let registered = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({ "name": name, "email": email, "password": "password123" })),
                None,
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text);

        let login = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": "password123" })),
                None,
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text);

        (
            login.json["user"]["id"].as_str().expect("user id").to_string(),
            login.json["access_token"]
                .as_str()
                .expect("access token")
                .to_string(),
        )
    }

    async fn skill(&self, token: &str, name: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/skills",
                Some(json!({
                    "name": name,
                    "category": "Crafts",
                    "proficiency": 60,
                    "skill_type": "teaching"
                })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json["id"].as_str().expect("skill id").to_string()
    }
}

struct TestResponse {
    status: StatusCode,
    text: String,
    json: Value,
}

fn date_in(days: u64) -> String {
    Local::now()
        .date_naive()
        .checked_add_days(Days::new(days))
        .expect("date in range")
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["status"], "ok");

    let response = app.request(Method::GET, "/swagger-ui/", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("swagger"));
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.member("Expiring").await;

    let expired_at = (Utc::now() - Duration::minutes(5)).to_rfc3339();
    sqlx::query("UPDATE auth_sessions SET expires_at = ? WHERE token = ?")
        .bind(&expired_at)
        .bind(&token)
        .execute(app.pool())
        .await
        .expect("expire session");

    let response = app
        .request(Method::GET, "/auth/profile", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auth_sessions WHERE token = ?")
        .bind(&token)
        .fetch_one(app.pool())
        .await
        .expect("count sessions");
    assert_eq!(remaining, 0, "expired token should be purged");
}

#[tokio::test]
async fn skill_swap_journey() {
    let app = TestApp::new().await;
    let (maker_id, maker) = app.member("Maker").await;
    let (learner_id, learner) = app.member("Learner").await;

    let pottery = app.skill(&maker, "Pottery").await;
    let knitting = app.skill(&learner, "Knitting").await;

    let session = app
        .request(
            Method::POST,
            "/sessions",
            Some(json!({
                "title": "Wheel throwing",
                "date": date_in(2),
                "start_time": "14:00",
                "end_time": "16:00",
                "skill_category": "Crafts",
                "max_participants": 3,
                "teach_skill_id": pottery
            })),
            Some(&maker),
        )
        .await;
    assert_eq!(session.status, StatusCode::CREATED, "{}", session.text);
    assert_eq!(session.json["teach_skill_name"], "Pottery");
    let session_id = session.json["id"].as_str().expect("session id").to_string();

    let joined = app
        .request(
            Method::POST,
            &format!("/sessions/{session_id}/join"),
            None,
            Some(&learner),
        )
        .await;
    assert_eq!(joined.status, StatusCode::OK, "{}", joined.text);

    let request = app
        .request(
            Method::POST,
            "/exchange-requests",
            Some(json!({
                "session_id": session_id,
                "recipient_id": maker_id,
                "offered_skill_id": knitting,
                "requested_skill_id": pottery,
                "message": "Knitting for pottery?"
            })),
            Some(&learner),
        )
        .await;
    assert_eq!(request.status, StatusCode::CREATED, "{}", request.text);
    let request_id = request.json["id"].as_str().expect("request id").to_string();

    let unread = app
        .request(Method::GET, "/notifications/unread-count", None, Some(&maker))
        .await;
    assert_eq!(unread.json["count"], 1);

    let accepted = app
        .request(
            Method::PATCH,
            &format!("/exchange-requests/{request_id}"),
            Some(json!({ "status": "accepted" })),
            Some(&maker),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.text);
    assert_eq!(accepted.json["status"], "accepted");

    let scheduled = app
        .request(
            Method::POST,
            "/exchange-sessions",
            Some(json!({
                "title": "Pottery for knitting",
                "date": date_in(1),
                "start_time": "09:00",
                "end_time": "10:30",
                "skill_category": "Crafts",
                "requested_by": learner_id,
                "skill_id": pottery,
                "requested_skill_id": knitting
            })),
            Some(&maker),
        )
        .await;
    assert_eq!(scheduled.status, StatusCode::CREATED, "{}", scheduled.text);
    let exchange_id = scheduled.json["id"].as_str().expect("exchange id").to_string();

    let upcoming = app
        .request(
            Method::GET,
            "/exchange-sessions/upcoming-dashboard",
            None,
            Some(&learner),
        )
        .await;
    assert_eq!(upcoming.json.as_array().map(Vec::len), Some(1));

    let conversation = app
        .request(
            Method::POST,
            "/messages/conversations",
            Some(json!({ "participant_id": maker_id })),
            Some(&learner),
        )
        .await;
    assert_eq!(conversation.status, StatusCode::OK, "{}", conversation.text);
    let conversation_id = conversation.json["id"].as_str().expect("conversation id");

    let sent = app
        .request(
            Method::POST,
            &format!("/messages/conversations/{conversation_id}/messages"),
            Some(json!({ "content": "See you tomorrow!" })),
            Some(&learner),
        )
        .await;
    assert_eq!(sent.status, StatusCode::CREATED, "{}", sent.text);

    let completed = app
        .request(
            Method::PUT,
            &format!("/exchange-sessions/{exchange_id}"),
            Some(json!({ "status": "completed" })),
            Some(&learner),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK, "{}", completed.text);

    let stats = app
        .request(Method::GET, "/exchange-sessions/stats", None, Some(&maker))
        .await;
    assert_eq!(
        stats.json,
        json!({ "completed_sessions": 1, "scheduled_sessions": 0, "unique_partners": 1 })
    );

    let dashboard = app
        .request(Method::GET, "/dashboard/data", None, Some(&learner))
        .await;
    assert_eq!(dashboard.status, StatusCode::OK, "{}", dashboard.text);
    assert_eq!(dashboard.json["stats"]["completed_sessions"], 1);
    assert_eq!(dashboard.json["recent_connections"][0]["partner_id"], maker_id.as_str());
    assert_eq!(
        dashboard.json["kpi_analytics"]["weekly_activity"]
            .as_array()
            .map(Vec::len),
        Some(7)
    );

    let stats = app
        .request(Method::GET, &format!("/users/{learner_id}/stats"), None, Some(&maker))
        .await;
    assert_eq!(stats.json["participated_sessions"], 1);
}

#[tokio::test]
async fn expiry_pass_runs_against_the_live_schema() {
    let app = TestApp::new().await;
    let (_, host) = app.member("Host").await;
    let (partner_id, partner) = app.member("Partner").await;
    let skill = app.skill(&host, "Woodwork").await;
    let wanted = app.skill(&partner, "Sewing").await;

    let scheduled = app
        .request(
            Method::POST,
            "/exchange-sessions",
            Some(json!({
                "title": "Overdue swap",
                "date": "2021-06-01",
                "start_time": "09:00",
                "end_time": "10:00",
                "skill_category": "Crafts",
                "requested_by": partner_id,
                "skill_id": skill,
                "requested_skill_id": wanted
            })),
            Some(&host),
        )
        .await;
    assert_eq!(scheduled.status, StatusCode::CREATED, "{}", scheduled.text);

    let expired = jobs::run_expiry_once(app.pool())
        .await
        .expect("run expiry pass");
    assert_eq!(expired, 1);

    let fetched = app
        .request(
            Method::GET,
            &format!(
                "/exchange-sessions/{}",
                scheduled.json["id"].as_str().expect("exchange id")
            ),
            None,
            Some(&partner),
        )
        .await;
    assert_eq!(fetched.json["status"], "expired");
}
