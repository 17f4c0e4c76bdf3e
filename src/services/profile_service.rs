use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::profile_repo;

#[derive(Serialize)]
pub struct ProfileView {
    pub user_id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub custom_beer_cost: Option<f64>,
}

pub async fn load_profile(pool: &SqlitePool, user_id: &str) -> sqlx::Result<ProfileView> {
    let row = profile_repo::load_user(pool, user_id).await?;
    Ok(match row {
        Some(r) => ProfileView {
            user_id: r.user_id,
            username: r.username,
            full_name: r.full_name,
            avatar_url: r.avatar_url,
            custom_beer_cost: r.custom_beer_cost,
        },
        // A first login has no profile row yet; render an empty one.
        None => ProfileView {
            user_id: user_id.to_string(),
            username: None,
            full_name: None,
            avatar_url: None,
            custom_beer_cost: None,
        },
    })
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    username: Option<&str>,
    full_name: Option<&str>,
    avatar_url: Option<&str>,
    custom_beer_cost: Option<f64>,
) -> sqlx::Result<ProfileView> {
    if custom_beer_cost.is_some_and(|c| c < 0.0) {
        return Err(sqlx::Error::Protocol("beer cost cannot be negative".into()));
    }

    let username = username.map(str::trim).filter(|s| !s.is_empty());
    let full_name = full_name.map(str::trim).filter(|s| !s.is_empty());
    let avatar_url = avatar_url.map(str::trim).filter(|s| !s.is_empty());

    profile_repo::upsert_profile(pool, user_id, username, full_name, avatar_url, custom_beer_cost)
        .await?;
    load_profile(pool, user_id).await
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

    #[tokio::test]
    async fn missing_profile_renders_empty() {
        let pool = test_pool().await;
        let view = load_profile(&pool, "u1").await.unwrap();
        assert_eq!(view.user_id, "u1");
        assert!(view.username.is_none());
    }

    #[tokio::test]
    async fn update_trims_and_persists() {
        let pool = test_pool().await;
        let view = update_profile(&pool, "u1", Some("  anna  "), None, None, Some(13.5))
            .await
            .unwrap();
        assert_eq!(view.username.as_deref(), Some("anna"));
        assert_eq!(view.custom_beer_cost, Some(13.5));

        assert!(update_profile(&pool, "u1", None, None, None, Some(-1.0))
            .await
            .is_err());
    }
}
