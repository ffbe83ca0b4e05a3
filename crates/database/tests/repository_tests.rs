use skillswap_config::DatabaseConfig;
use skillswap_database::{
    initialize_database, ConversationRepository, ExchangeRequestRepository,
    ExchangeRequestStatus, ExchangeSessionRepository, ExchangeSessionStatus, JoinOutcome,
    MessageType, NewExchangeRequest, NewExchangeSession, NewNotification, NewSession, NewSkill,
    NewUser, NotificationRepository, SessionRepository, SessionStatus, SessionUpdate, SkillRepository, SkillType, SkillUpdate,
    UserRepository, UserStatus, UserUpdate, DatabaseError, DEFAULT_AVATAR_URL,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

struct TestDb {
    pool: SqlitePool,
    _dir: TempDir,
}

impl TestDb {
    async fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("repos.db").display()),
            max_connections: 4,
        };
        let pool = initialize_database(&config).await.expect("initialise database");
        Self { pool, _dir: dir }
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    async fn user(&self, name: &str) -> String {
        self.users()
            .create(&NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "hash".into(),
                location: Some("Berlin".into()),
                bio: Some(format!("{name} likes pottery")),
                avatar: None,
            })
            .await
            .expect("create user")
            .id
    }

    async fn skill(&self, owner: &str, name: &str, skill_type: SkillType) -> String {
        SkillRepository::new(self.pool.clone())
            .create(&NewSkill {
                user_id: owner.to_string(),
                name: name.to_string(),
                category: "Programming".into(),
                proficiency: 70,
                skill_type,
                description: Some(format!("All about {name}")),
                experience: None,
                goals: None,
                agenda: vec!["basics".into()],
            })
            .await
            .expect("create skill")
            .id
    }

    async fn session(&self, host: &str, date: &str, max_participants: i64) -> String {
        SessionRepository::new(self.pool.clone())
            .create(&NewSession {
                host_id: host.to_string(),
                title: "Rust for beginners".into(),
                description: None,
                date: date.to_string(),
                start_time: "10:00".into(),
                end_time: "11:30".into(),
                skill_category: "Programming".into(),
                is_teaching: true,
                max_participants,
                is_public: true,
                teach_skill_id: None,
                teach_skill_name: Some("Rust".into()),
                sub_topics: vec!["ownership".into()],
                meeting_link: None,
                focus_keywords: vec!["borrowing".into()],
            })
            .await
            .expect("create session")
            .id
    }

    async fn exchange_session(&self, host: &str, requester: &str, date: &str, start: &str) -> String {
        let skill = self.skill(host, "Guitar", SkillType::Teaching).await;
        let requested = self.skill(requester, "Spanish", SkillType::Teaching).await;
        ExchangeSessionRepository::new(self.pool.clone())
            .create(&NewExchangeSession {
                title: "Guitar for Spanish".into(),
                description: None,
                date: date.to_string(),
                start_time: start.to_string(),
                end_time: "23:59".into(),
                skill_category: "Music".into(),
                max_participants: 2,
                is_public: false,
                host_id: host.to_string(),
                requested_by: requester.to_string(),
                skill_id: skill,
                requested_skill_id: requested,
                meeting_link: None,
                focus_keywords: Vec::new(),
                requested_skill_focus_keywords: Vec::new(),
                session_agenda: vec!["warm up".into()],
            })
            .await
            .expect("create exchange session")
            .id
    }
}

#[tokio::test]
async fn users_are_unique_by_lowercased_email() {
    let db = TestDb::new().await;
    let repo = db.users();

    let user = repo
        .create(&NewUser {
            name: "  Ada  ".into(),
            email: "Ada@Example.com".into(),
            password_hash: "hash".into(),
            location: None,
            bio: None,
            avatar: Some("".into()),
        })
        .await
        .unwrap();

    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.avatar, DEFAULT_AVATAR_URL);
    assert_eq!(user.status, UserStatus::Offline);

    let duplicate = repo
        .create(&NewUser {
            name: "Other".into(),
            email: "ADA@example.com".into(),
            password_hash: "hash".into(),
            location: None,
            bio: None,
            avatar: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(duplicate, DatabaseError::Duplicate(_)));

    let (found, hash) = repo.find_credentials("ada@EXAMPLE.com").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(hash, "hash");
}

#[tokio::test]
async fn user_search_update_and_suggestions() {
    let db = TestDb::new().await;
    let ada = db.user("Ada").await;
    let grace = db.user("Grace").await;
    db.user("Linus").await;

    let hits = db.users().search("POTTERY", 10, 0).await.unwrap();
    assert_eq!(hits.total, 3);
    assert_eq!(hits.items.len(), 3);
    let hits = db.users().search("grace@", 10, 0).await.unwrap();
    assert_eq!(hits.total, 1);
    assert_eq!(hits.items[0].id, grace);
    assert_eq!(db.users().search("100%", 10, 0).await.unwrap().total, 0);

    let second_page = db.users().search("pottery", 2, 2).await.unwrap();
    assert_eq!(second_page.total, 3);
    assert_eq!(second_page.items.len(), 1);

    let updated = db
        .users()
        .update(
            &ada,
            &UserUpdate {
                bio: Some("Analytical engines".into()),
                status: Some(UserStatus::Busy),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Analytical engines"));
    assert_eq!(updated.status, UserStatus::Busy);
    assert_eq!(updated.location.as_deref(), Some("Berlin"));

    let suggested = db.users().suggested(&ada, 10).await.unwrap();
    assert_eq!(suggested.len(), 2);
    assert!(suggested.iter().all(|user| user.id != ada));

    assert_eq!(db.users().count().await.unwrap(), 3);
    assert_eq!(db.users().list(2, 0).await.unwrap().len(), 2);
    assert_eq!(db.users().list(2, 2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn search_ignores_case_beyond_ascii() {
    let db = TestDb::new().await;
    let elodie = db.user("ÉLODIE").await;
    db.user("Elodie").await;

    for query in ["élodie", "ÉLODIE", "Élodie"] {
        let hits = db.users().search(query, 10, 0).await.unwrap();
        assert_eq!(hits.total, 1, "query {query}");
        assert_eq!(hits.items[0].id, elodie);
    }

    let skills = SkillRepository::new(db.pool.clone());
    db.skill(&elodie, "Crème brûlée", SkillType::Teaching).await;
    let hits = skills.search("CRÈME BRÛLÉE", None, 10, 0).await.unwrap();
    assert_eq!(hits.total, 1);
    assert_eq!(hits.items[0].name, "Crème brûlée");
}

#[tokio::test]
async fn session_searches_filter_by_status_and_paginate() {
    let db = TestDb::new().await;
    let host = db.user("Host").await;
    let guest = db.user("Guest").await;
    for day in ["2030-01-01", "2030-01-02", "2030-01-03"] {
        db.session(&host, day, 4).await;
    }

    let sessions = SessionRepository::new(db.pool.clone());
    let page = sessions.search("RUST", None, 2, 0).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].date, "2030-01-01");
    let page = sessions.search("rust", None, 2, 2).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].date, "2030-01-03");
    let page = sessions
        .search("rust", Some(SessionStatus::Completed), 10, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let upcoming = db.exchange_session(&host, &guest, "2030-02-01", "09:00").await;
    let overdue = db.exchange_session(&host, &guest, "2020-02-01", "09:00").await;
    let exchanges = ExchangeSessionRepository::new(db.pool.clone());
    assert_eq!(exchanges.expire_overdue("2025-01-01", "12:00").await.unwrap(), 1);

    let all = exchanges.search("guitar", None, 10, 0).await.unwrap();
    assert_eq!(all.total, 2);
    let expired = exchanges
        .search("GUITAR", Some(ExchangeSessionStatus::Expired), 10, 0)
        .await
        .unwrap();
    assert_eq!(expired.total, 1);
    assert_eq!(expired.items[0].id, overdue);
    let open = exchanges
        .search("music", Some(ExchangeSessionStatus::Upcoming), 10, 0)
        .await
        .unwrap();
    assert_eq!(open.items[0].id, upcoming);
}

#[tokio::test]
async fn skill_search_filters_by_type_and_updates_metadata() {
    let db = TestDb::new().await;
    let owner = db.user("Ada").await;
    let rust = db.skill(&owner, "Rust", SkillType::Teaching).await;
    db.skill(&owner, "Rust macros", SkillType::Learning).await;
    db.skill(&owner, "Knitting", SkillType::Teaching).await;

    let repo = SkillRepository::new(db.pool.clone());
    assert_eq!(repo.search("rust", None, 50, 0).await.unwrap().total, 2);
    let teaching = repo.search("RUST", Some(SkillType::Teaching), 50, 0).await.unwrap();
    assert_eq!(teaching.total, 1);
    assert_eq!(teaching.items[0].id, rust);
    assert_eq!(repo.search("", Some(SkillType::Teaching), 50, 0).await.unwrap().total, 2);

    let snapshot = repo.find_by_id(&rust).await.unwrap().unwrap();
    assert!(repo
        .set_metadata_if_current(&snapshot, &["cargo".into(), "traits".into()])
        .await
        .unwrap());
    let updated = repo
        .update(
            &rust,
            &SkillUpdate {
                proficiency: Some(90),
                ..SkillUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.metadata, vec!["cargo", "traits"]);
    assert_eq!(updated.proficiency, 90);
    assert_eq!(updated.agenda, vec!["basics"]);

    repo.update(
        &rust,
        &SkillUpdate {
            name: Some("Rust async".into()),
            ..SkillUpdate::default()
        },
    )
    .await
    .unwrap();
    let stale = repo
        .set_metadata_if_current(&snapshot, &["outdated".into()])
        .await
        .unwrap();
    assert!(!stale);
    let renamed = repo.find_by_id(&rust).await.unwrap().unwrap();
    assert_eq!(renamed.metadata, vec!["cargo", "traits"]);

    let categories = repo.category_counts(&owner).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].count, 3);

    assert!(repo.delete(&rust).await.unwrap());
    assert!(repo.find_by_id(&rust).await.unwrap().is_none());
    assert_eq!(repo.count_by_user(&owner).await.unwrap(), 2);
}

#[tokio::test]
async fn joining_respects_capacity_and_membership() {
    let db = TestDb::new().await;
    let host = db.user("Host").await;
    let alice = db.user("Alice").await;
    let bob = db.user("Bob").await;
    let session_id = db.session(&host, "2030-01-01", 1).await;
    let repo = SessionRepository::new(db.pool.clone());

    assert_eq!(repo.add_participant(&session_id, &alice).await.unwrap(), JoinOutcome::Joined);
    assert_eq!(
        repo.add_participant(&session_id, &alice).await.unwrap(),
        JoinOutcome::AlreadyParticipant
    );
    assert_eq!(repo.add_participant(&session_id, &bob).await.unwrap(), JoinOutcome::Full);

    let session = repo.find_by_id(&session_id).await.unwrap().unwrap();
    assert_eq!(session.participants, vec![alice.clone()]);

    let mine = repo.list_for_member(&alice).await.unwrap();
    assert_eq!(mine.len(), 1);

    assert!(repo.remove_participant(&session_id, &alice).await.unwrap());
    assert!(!repo.remove_participant(&session_id, &alice).await.unwrap());
    assert!(repo.list_for_member(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn upcoming_sessions_are_bounded_by_date_window() {
    let db = TestDb::new().await;
    let host = db.user("Host").await;
    db.session(&host, "2030-01-01", 5).await;
    db.session(&host, "2030-01-03", 5).await;
    db.session(&host, "2030-01-09", 5).await;

    let repo = SessionRepository::new(db.pool.clone());
    let window = repo
        .upcoming_for_member(&host, "2030-01-01", "2030-01-04")
        .await
        .unwrap();
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].date, "2030-01-01");

    let public = repo.list_public_upcoming().await.unwrap();
    assert_eq!(public.len(), 3);
    assert_eq!(public[2].date, "2030-01-09");
}

#[tokio::test]
async fn exchange_request_transitions_only_from_expected_status() {
    let db = TestDb::new().await;
    let host = db.user("Host").await;
    let requester = db.user("Requester").await;
    let session_id = db.session(&host, "2030-01-01", 3).await;
    let offered = db.skill(&requester, "Spanish", SkillType::Teaching).await;
    let requested = db.skill(&host, "Rust", SkillType::Teaching).await;

    let repo = ExchangeRequestRepository::new(db.pool.clone());
    let request = repo
        .create(&NewExchangeRequest {
            session_id: session_id.clone(),
            requester_id: requester.clone(),
            recipient_id: host.clone(),
            offered_skill_id: offered,
            requested_skill_id: requested,
            message: Some("Swap?".into()),
        })
        .await
        .unwrap();

    assert_eq!(request.status, ExchangeRequestStatus::Pending);
    assert_eq!(request.requester_name.as_deref(), Some("Requester"));
    assert_eq!(request.offered_skill_name.as_deref(), Some("Spanish"));
    assert_eq!(request.session_title.as_deref(), Some("Rust for beginners"));

    let accepted = repo
        .transition_status(
            &request.id,
            ExchangeRequestStatus::Pending,
            ExchangeRequestStatus::Accepted,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.status, ExchangeRequestStatus::Accepted);

    let stale = repo
        .transition_status(
            &request.id,
            ExchangeRequestStatus::Pending,
            ExchangeRequestStatus::Rejected,
        )
        .await
        .unwrap();
    assert!(stale.is_none());

    assert_eq!(repo.list_for_user(&host).await.unwrap().len(), 1);
    assert_eq!(repo.list_for_host(&host).await.unwrap().len(), 1);
    assert!(repo.list_for_host(&requester).await.unwrap().is_empty());
    assert_eq!(repo.list_by_session(&session_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn expire_overdue_only_touches_past_upcoming_sessions() {
    let db = TestDb::new().await;
    let host = db.user("Host").await;
    let partner = db.user("Partner").await;

    let yesterday = db.exchange_session(&host, &partner, "2030-05-09", "18:00").await;
    let earlier_today = db.exchange_session(&host, &partner, "2030-05-10", "08:00").await;
    let later_today = db.exchange_session(&host, &partner, "2030-05-10", "20:00").await;
    let tomorrow = db.exchange_session(&host, &partner, "2030-05-11", "08:00").await;

    let repo = ExchangeSessionRepository::new(db.pool.clone());
    let expired = repo.expire_overdue("2030-05-10", "12:00").await.unwrap();
    assert_eq!(expired, 2);

    let status = |id: String| {
        let repo = repo.clone();
        async move { repo.find_by_id(&id).await.unwrap().unwrap().status }
    };
    assert_eq!(status(yesterday).await, ExchangeSessionStatus::Expired);
    assert_eq!(status(earlier_today).await, ExchangeSessionStatus::Expired);
    assert_eq!(status(later_today).await, ExchangeSessionStatus::Upcoming);
    assert_eq!(status(tomorrow.clone()).await, ExchangeSessionStatus::Upcoming);

    assert_eq!(repo.expire_overdue("2030-05-10", "12:00").await.unwrap(), 0);

    let session = repo.find_by_id(&tomorrow).await.unwrap().unwrap();
    let pair = repo
        .list_by_skill_pair(&session.requested_skill_id, &session.skill_id)
        .await
        .unwrap();
    assert_eq!(pair.len(), 1);
    assert_eq!(pair[0].id, tomorrow);
}

#[tokio::test]
async fn notifications_hide_soft_deleted_rows() {
    let db = TestDb::new().await;
    let alice = db.user("Alice").await;
    let bob = db.user("Bob").await;
    let repo = NotificationRepository::new(db.pool.clone());

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let notification = repo
            .create(&NewNotification {
                recipient_id: alice.clone(),
                sender_id: Some(bob.clone()),
                title: title.into(),
                message: "hello".into(),
                notification_type: "info".into(),
                exchange_request_id: None,
                session_id: None,
            })
            .await
            .unwrap();
        ids.push(notification.id);
    }

    let listed = repo.list_for_recipient(&alice, false).await.unwrap();
    assert_eq!(listed[0].title, "three");
    assert_eq!(repo.unread_count(&alice).await.unwrap(), 3);

    assert!(repo.mark_read(&ids[0], &bob).await.unwrap().is_none());
    assert!(repo.mark_read(&ids[0], &alice).await.unwrap().unwrap().is_read);
    assert_eq!(repo.list_for_recipient(&alice, true).await.unwrap().len(), 2);

    assert!(repo.soft_delete(&ids[1], &alice).await.unwrap());
    assert!(!repo.soft_delete(&ids[1], &alice).await.unwrap());
    assert_eq!(repo.list_for_recipient(&alice, false).await.unwrap().len(), 2);

    assert_eq!(repo.mark_all_read(&alice).await.unwrap(), 1);
    assert_eq!(repo.unread_count(&alice).await.unwrap(), 0);
}

#[tokio::test]
async fn conversations_track_last_message() {
    let db = TestDb::new().await;
    let alice = db.user("Alice").await;
    let bob = db.user("Bob").await;
    let repo = ConversationRepository::new(db.pool.clone());

    let (conversation, created) = repo.open_between(&alice, &bob).await.unwrap();
    assert!(created);
    assert_eq!(conversation.participants.len(), 2);
    assert!(conversation.last_message.is_none());
    let (reopened, created) = repo.open_between(&bob, &alice).await.unwrap();
    assert!(!created);
    assert_eq!(reopened.id, conversation.id);

    repo.insert_message(&conversation.id, &alice, "hi", MessageType::Text)
        .await
        .unwrap();
    let second = repo
        .insert_message(&conversation.id, &bob, "hello", MessageType::Text)
        .await
        .unwrap();

    let reloaded = repo.find_by_id(&conversation.id).await.unwrap().unwrap();
    assert_eq!(reloaded.last_message.map(|m| m.id), Some(second.id));

    let page = repo.list_messages(&conversation.id, 10, 0).await.unwrap();
    assert_eq!(page[0].content, "hello");
    assert_eq!(repo.count_messages(&conversation.id).await.unwrap(), 2);
    assert_eq!(repo.list_for_user(&bob, 10, 0).await.unwrap().len(), 1);
    assert_eq!(repo.count_for_user(&alice).await.unwrap(), 1);
}

#[tokio::test]
async fn stale_session_metadata_is_discarded() {
    let db = TestDb::new().await;
    let host = db.user("Host").await;
    let id = db.session(&host, "2030-01-01", 2).await;
    let sessions = SessionRepository::new(db.pool.clone());
    let snapshot = sessions.find_by_id(&id).await.unwrap().unwrap();

    sessions
        .update(
            &id,
            &SessionUpdate {
                focus_keywords: Some(vec!["lifetimes".into()]),
                ..SessionUpdate::default()
            },
        )
        .await
        .unwrap();
    let fresh = sessions.find_by_id(&id).await.unwrap().unwrap();

    assert!(!sessions
        .set_metadata_if_current(&snapshot, &["borrowing".into()])
        .await
        .unwrap());
    assert!(sessions
        .set_metadata_if_current(&fresh, &["lifetimes".into()])
        .await
        .unwrap());
    let stored = sessions.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.metadata, vec!["lifetimes"]);
}

#[tokio::test]
async fn concurrent_opens_share_one_conversation() {
    let db = TestDb::new().await;
    let alice = db.user("Alice").await;
    let bob = db.user("Bob").await;

    let mut handles = Vec::new();
    for round in 0..8 {
        let repo = ConversationRepository::new(db.pool.clone());
        let (first, second) = if round % 2 == 0 {
            (alice.clone(), bob.clone())
        } else {
            (bob.clone(), alice.clone())
        };
        handles.push(tokio::spawn(async move {
            repo.open_between(&first, &second).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    let mut created = 0;
    for handle in handles {
        let (conversation, was_created) = handle.await.unwrap();
        created += usize::from(was_created);
        ids.push(conversation.id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(created, 1);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
