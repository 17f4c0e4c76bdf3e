use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: String,
    pub user_id: String,
    pub festival_id: String,
    pub tent_id: String,
    pub start_at: String,
    pub end_at: Option<String>,
    pub reminder_offset_minutes: Option<i64>,
    pub status: String,
}

/// Reservation joined with the tent's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservationWithTentRow {
    pub reservation_id: String,
    pub user_id: String,
    pub start_at: String,
    pub end_at: Option<String>,
    pub tent_name: Option<String>,
}
