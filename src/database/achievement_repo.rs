use sqlx::SqlitePool;

use crate::models::{AchievementRow, AchievementWithUnlockRow};

const SQL_LIST_ACHIEVEMENTS: &str = r#"
SELECT
  achievement_id,
  name,
  description,
  rarity,
  points,
  metric,
  threshold
FROM achievements
ORDER BY points ASC
"#;

pub async fn list_achievements(pool: &SqlitePool) -> sqlx::Result<Vec<AchievementRow>> {
    sqlx::query_as::<_, AchievementRow>(SQL_LIST_ACHIEVEMENTS)
        .fetch_all(pool)
        .await
}

const SQL_LIST_WITH_UNLOCKS: &str = r#"
SELECT
  a.achievement_id,
  a.name,
  a.description,
  a.rarity,
  a.points,
  a.metric,
  a.threshold,
  ua.unlocked_at
FROM achievements a
LEFT JOIN user_achievements ua
  ON ua.achievement_id = a.achievement_id
  AND ua.user_id = ?
  AND ua.festival_id = ?
ORDER BY a.points ASC
"#;

pub async fn list_with_unlocks(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<AchievementWithUnlockRow>> {
    sqlx::query_as::<_, AchievementWithUnlockRow>(SQL_LIST_WITH_UNLOCKS)
        .bind(user_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_INSERT_UNLOCK: &str = r#"
INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, festival_id)
VALUES (?1, ?2, ?3)
"#;

pub async fn insert_unlock(
    pool: &SqlitePool,
    user_id: &str,
    achievement_id: &str,
    festival_id: &str,
) -> sqlx::Result<bool> {
    let res = sqlx::query(SQL_INSERT_UNLOCK)
        .bind(user_id)
        .bind(achievement_id)
        .bind(festival_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}
