use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::{achievement_repo, stats_repo};
use crate::database::stats_repo::UserStatsRow;

#[derive(Debug, Clone, Serialize)]
pub struct AchievementView {
    pub achievement_id: String,
    pub name: String,
    pub description: Option<String>,
    pub rarity: String,
    pub points: i64,
    pub unlocked: bool,
    pub unlocked_at: Option<String>,
}

pub async fn list_with_unlock_state(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<AchievementView>> {
    let rows = achievement_repo::list_with_unlocks(pool, user_id, festival_id).await?;
    Ok(rows
        .into_iter()
        .map(|r| AchievementView {
            achievement_id: r.achievement_id,
            name: r.name,
            description: r.description,
            rarity: r.rarity,
            points: r.points,
            unlocked: r.unlocked_at.is_some(),
            unlocked_at: r.unlocked_at,
        })
        .collect())
}

/// Unlock every achievement whose threshold the user's stats now meet.
/// Returns how many new unlocks were recorded.
pub async fn evaluate_for_user(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<usize> {
    let stats = stats_repo::load_user_stats(pool, user_id, festival_id).await?;
    let achievements = achievement_repo::list_achievements(pool).await?;

    let mut unlocked = 0;
    for achievement in achievements {
        let Some(value) = metric_value(&stats, &achievement.metric) else {
            continue;
        };
        if value < achievement.threshold {
            continue;
        }
        let fresh = achievement_repo::insert_unlock(
            pool,
            user_id,
            &achievement.achievement_id,
            festival_id,
        )
        .await?;
        if fresh {
            unlocked += 1;
        }
    }

    Ok(unlocked)
}

fn metric_value(stats: &UserStatsRow, metric: &str) -> Option<i64> {
    match metric {
        "total_beers" => Some(stats.total_beers),
        "days_attended" => Some(stats.days_attended),
        "distinct_tents" => Some(stats.distinct_tents),
        "photos_uploaded" => Some(stats.photos_uploaded),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::ensure_schema(&pool).await.unwrap();
        pool
    }

    async fn seed(pool: &SqlitePool) {
        sqlx::query(
            "INSERT INTO achievements (achievement_id, name, rarity, points, metric, threshold)
             VALUES
               ('first-beer', 'First Prost', 'common', 10, 'total_beers', 1),
               ('ten-beers', 'Double Digits', 'rare', 50, 'total_beers', 10),
               ('three-days', 'Regular', 'uncommon', 30, 'days_attended', 3)",
        )
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO attendances (attendance_id, user_id, festival_id, date, beer_count)
             VALUES
               ('a1', 'u1', 'f1', '2024-09-20', 4),
               ('a2', 'u1', 'f1', '2024-09-21', 3)",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unlocks_only_met_thresholds() {
        let pool = test_pool().await;
        seed(&pool).await;

        // 7 beers over 2 days: first-beer unlocks, ten-beers and
        // three-days do not.
        let unlocked = evaluate_for_user(&pool, "u1", "f1").await.unwrap();
        assert_eq!(unlocked, 1);

        let views = list_with_unlock_state(&pool, "u1", "f1").await.unwrap();
        let first = views
            .iter()
            .find(|v| v.achievement_id == "first-beer")
            .unwrap();
        assert!(first.unlocked);
        let ten = views
            .iter()
            .find(|v| v.achievement_id == "ten-beers")
            .unwrap();
        assert!(!ten.unlocked);
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let pool = test_pool().await;
        seed(&pool).await;

        assert_eq!(evaluate_for_user(&pool, "u1", "f1").await.unwrap(), 1);
        assert_eq!(evaluate_for_user(&pool, "u1", "f1").await.unwrap(), 0);
    }
}
