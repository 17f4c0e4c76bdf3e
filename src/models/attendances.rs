use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceRow {
    pub attendance_id: String,
    pub user_id: String,
    pub festival_id: String,
    pub date: String,
    pub beer_count: i64,
    pub created_at: Option<String>,
}
