use sqlx::SqlitePool;

use crate::models::UsersRow;

const SQL_LOAD_USER: &str = r#"
SELECT
  user_id,
  username,
  full_name,
  avatar_url,
  custom_beer_cost,
  created_at
FROM users
WHERE user_id = ?
"#;

pub async fn load_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_PROFILE: &str = r#"
INSERT INTO users (user_id, username, full_name, avatar_url, custom_beer_cost)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (user_id) DO UPDATE SET
  username = excluded.username,
  full_name = excluded.full_name,
  avatar_url = excluded.avatar_url,
  custom_beer_cost = excluded.custom_beer_cost
"#;

pub async fn upsert_profile(
    pool: &SqlitePool,
    user_id: &str,
    username: Option<&str>,
    full_name: Option<&str>,
    avatar_url: Option<&str>,
    custom_beer_cost: Option<f64>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_PROFILE)
        .bind(user_id)
        .bind(username)
        .bind(full_name)
        .bind(avatar_url)
        .bind(custom_beer_cost)
        .execute(pool)
        .await?;
    Ok(())
}
