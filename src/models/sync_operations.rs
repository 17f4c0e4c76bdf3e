#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncOperationRow {
    pub id: String,
    pub table_name: String,
    pub operation: String,
    pub payload: String,
    pub status: String,
    pub retry_count: i64,
    pub last_error: Option<String>,
    pub created_at: Option<String>,
}
