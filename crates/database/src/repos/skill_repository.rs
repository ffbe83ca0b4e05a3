//! Skill repository for database operations.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::search::{SearchPage, SearchTerm};
use crate::entities::{
    decode_list, encode_list, new_id, parse_enum, timestamp_now, CategoryCount, NewSkill, Skill,
    SkillType, SkillUpdate,
};
use crate::types::{DatabaseError, DatabaseResult};

const SKILL_COLUMNS: &str = "id, user_id, name, category, proficiency, skill_type, description, \
     experience, goals, agenda, metadata, created_at, updated_at";

#[derive(Clone)]
pub struct SkillRepository {
    pool: SqlitePool,
}

impl SkillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, skill: &NewSkill) -> DatabaseResult<Skill> {
        let id = new_id();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO skills (id, user_id, name, category, proficiency, skill_type, description,
                                 experience, goals, agenda, metadata, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '[]', ?, ?)",
        )
        .bind(&id)
        .bind(&skill.user_id)
        .bind(&skill.name)
        .bind(&skill.category)
        .bind(skill.proficiency)
        .bind(skill.skill_type.as_str())
        .bind(&skill.description)
        .bind(&skill.experience)
        .bind(&skill.goals)
        .bind(encode_list(&skill.agenda)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("skill {id}")))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Skill>> {
        let row = sqlx::query(&format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_skill).transpose()
    }

    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Skill>> {
        let rows = sqlx::query(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills WHERE user_id = ?
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_skill).collect()
    }

    pub async fn count_by_user(&self, user_id: &str) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM skills WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every skill owned by `user_id`, unpaginated.
    pub async fn all_by_user(&self, user_id: &str) -> DatabaseResult<Vec<Skill>> {
        self.list_by_user(user_id, i64::MAX, 0).await
    }

    /// Matches name, category or description. An empty query matches everything.
    pub async fn search(
        &self,
        query: &str,
        skill_type: Option<SkillType>,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<SearchPage<Skill>> {
        let term = SearchTerm::new(query);
        let rows = sqlx::query(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills
             WHERE ?1 IS NULL OR skill_type = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(skill_type.map(|value| value.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::new();
        for row in &rows {
            let skill = map_skill(row)?;
            let fields = [
                skill.name.as_str(),
                skill.category.as_str(),
                skill.description.as_deref().unwrap_or_default(),
            ];
            if term.matches_any(fields) {
                hits.push(skill);
            }
        }
        Ok(SearchPage::from_hits(hits, limit, offset))
    }

    pub async fn update(&self, id: &str, update: &SkillUpdate) -> DatabaseResult<Option<Skill>> {
        let agenda = update.agenda.as_deref().map(encode_list).transpose()?;
        let result = sqlx::query(
            "UPDATE skills SET
                name = COALESCE(?, name),
                category = COALESCE(?, category),
                proficiency = COALESCE(?, proficiency),
                skill_type = COALESCE(?, skill_type),
                description = COALESCE(?, description),
                experience = COALESCE(?, experience),
                goals = COALESCE(?, goals),
                agenda = COALESCE(?, agenda),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.category)
        .bind(update.proficiency)
        .bind(update.skill_type.map(|value| value.as_str()))
        .bind(&update.description)
        .bind(&update.experience)
        .bind(&update.goals)
        .bind(agenda)
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Replaces the enrichment keywords. Returns false when the skill no longer exists.
    /// Stores keyword metadata computed from `source`.
    ///
    /// Nothing is written once the skill is gone or its name or agenda changed,
    /// so a slow enrichment never overwrites the result of a newer one.
    pub async fn set_metadata_if_current(
        &self,
        source: &Skill,
        metadata: &[String],
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE skills SET metadata = ?, updated_at = ?
             WHERE id = ? AND name = ? AND agenda = ?",
        )
        .bind(encode_list(metadata)?)
        .bind(timestamp_now())
        .bind(&source.id)
        .bind(&source.name)
        .bind(encode_list(&source.agenda)?)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn category_counts(&self, user_id: &str) -> DatabaseResult<Vec<CategoryCount>> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) AS count FROM skills WHERE user_id = ?
             GROUP BY category ORDER BY count DESC, category ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CategoryCount {
                    category: row.try_get("category")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }
}

fn map_skill(row: &SqliteRow) -> DatabaseResult<Skill> {
    let skill_type: String = row.try_get("skill_type")?;
    let agenda: String = row.try_get("agenda")?;
    let metadata: String = row.try_get("metadata")?;
    Ok(Skill {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        proficiency: row.try_get("proficiency")?,
        skill_type: parse_enum("skill_type", &skill_type)?,
        description: row.try_get("description")?,
        experience: row.try_get("experience")?,
        goals: row.try_get("goals")?,
        agenda: decode_list("agenda", &agenda)?,
        metadata: decode_list("metadata", &metadata)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
