#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AchievementRow {
    pub achievement_id: String,
    pub name: String,
    pub description: Option<String>,
    pub rarity: String,
    pub points: i64,
    pub metric: String,
    pub threshold: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AchievementWithUnlockRow {
    pub achievement_id: String,
    pub name: String,
    pub description: Option<String>,
    pub rarity: String,
    pub points: i64,
    pub metric: String,
    pub threshold: i64,
    pub unlocked_at: Option<String>,
}
