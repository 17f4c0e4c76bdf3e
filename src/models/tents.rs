use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TentRow {
    pub tent_id: String,
    pub name: String,
    pub category: Option<String>,
}
