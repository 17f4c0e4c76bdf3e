use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupRow {
    pub group_id: String,
    pub festival_id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub winning_criteria: String,
    pub created_by: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupMemberRow {
    pub group_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub joined_at: Option<String>,
}
