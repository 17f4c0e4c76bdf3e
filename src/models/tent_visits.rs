/// Visit joined with the tent's display name, as the calendar needs it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TentVisitWithTentRow {
    pub visit_id: String,
    pub user_id: String,
    pub visited_at: Option<String>,
    pub tent_name: Option<String>,
}
