use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FestivalRow {
    pub festival_id: String,
    pub name: String,
    pub location: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub timezone: String,
    pub status: String,
    pub is_active: i64,
}
