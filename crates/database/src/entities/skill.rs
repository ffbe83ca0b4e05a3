//! Skill entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    /// Self-assessed level between 0 and 100.
    pub proficiency: i64,
    pub skill_type: SkillType,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub goals: Option<String>,
    pub agenda: Vec<String>,
    /// Keywords filled in asynchronously by the keyword service.
    pub metadata: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Teaching,
    Learning,
}

text_enum!(SkillType, "skill type", {
    Teaching => "teaching",
    Learning => "learning",
});

#[derive(Debug, Clone)]
pub struct NewSkill {
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub proficiency: i64,
    pub skill_type: SkillType,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub goals: Option<String>,
    pub agenda: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SkillUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<i64>,
    pub skill_type: Option<SkillType>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub goals: Option<String>,
    pub agenda: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}
