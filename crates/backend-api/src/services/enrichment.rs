//! Background keyword enrichment for skills and sessions.
//!
//! Each job asks the keyword service for keywords and writes them into the
//! row's `metadata` column. Failures are logged and stored as an empty list.
//! A job only writes while the row still matches the snapshot it started from.

use std::sync::Arc;

use skillswap_database::{Session, SessionRepository, Skill, SkillRepository};
use skillswap_integrations::{IntegrationError, KeywordClient};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

async fn fetch_keywords(keywords: &KeywordClient, topic: &str, sub_topics: &[String]) -> Vec<String> {
    match keywords.extract(topic, sub_topics).await {
        Ok(found) => found,
        Err(IntegrationError::Disabled) => {
            debug!(%topic, "keyword service disabled, storing no keywords");
            Vec::new()
        }
        Err(error) => {
            warn!(%topic, %error, "keyword enrichment failed");
            Vec::new()
        }
    }
}

pub fn spawn_skill_enrichment(
    pool: SqlitePool,
    keywords: Arc<KeywordClient>,
    skill: Skill,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let metadata = fetch_keywords(&keywords, &skill.name, &skill.agenda).await;
        match SkillRepository::new(pool)
            .set_metadata_if_current(&skill, &metadata)
            .await
        {
            Ok(true) => debug!(skill = %skill.id, count = metadata.len(), "skill enriched"),
            Ok(false) => debug!(skill = %skill.id, "skill changed before enrichment finished"),
            Err(error) => warn!(skill = %skill.id, %error, "failed to store skill metadata"),
        }
    })
}

pub fn spawn_session_enrichment(
    pool: SqlitePool,
    keywords: Arc<KeywordClient>,
    session: Session,
    topic: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let metadata = fetch_keywords(&keywords, &topic, &session.focus_keywords).await;
        match SessionRepository::new(pool)
            .set_metadata_if_current(&session, &metadata)
            .await
        {
            Ok(true) => debug!(session = %session.id, count = metadata.len(), "session enriched"),
            Ok(false) => debug!(session = %session.id, "session changed before enrichment finished"),
            Err(error) => warn!(session = %session.id, %error, "failed to store session metadata"),
        }
    })
}
