use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{festival_repo, group_repo};
use crate::models::GroupRow;
use crate::services::leaderboard_service::{self, LeaderboardView, WinningCriteria};

#[derive(Serialize)]
pub struct GroupMemberView {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub joined_at: Option<String>,
}

#[derive(Serialize)]
pub struct GroupDetailView {
    pub group_id: String,
    pub festival_id: String,
    pub name: String,
    pub description: Option<String>,
    pub winning_criteria: String,
    pub created_by: String,
    pub members: Vec<GroupMemberView>,
    pub leaderboard: LeaderboardView,
}

/// Insert the group and its creator's membership in one transaction.
pub async fn create_group_with_member(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    name: &str,
    password: Option<&str>,
    winning_criteria: &str,
    description: Option<&str>,
) -> sqlx::Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(sqlx::Error::Protocol("group name is required".into()));
    }
    let Some(criteria) = WinningCriteria::parse(winning_criteria) else {
        return Err(sqlx::Error::Protocol("unknown winning criteria".into()));
    };
    if festival_repo::load_festival(pool, festival_id).await?.is_none() {
        return Err(sqlx::Error::RowNotFound);
    }
    if group_repo::load_group_by_name(pool, festival_id, name)
        .await?
        .is_some()
    {
        return Err(sqlx::Error::Protocol(
            "a group with this name already exists".into(),
        ));
    }

    let group_id = Uuid::new_v4().to_string();
    let password = password.map(str::trim).filter(|s| !s.is_empty());

    let mut tx = pool.begin().await?;
    group_repo::insert_group(
        &mut tx,
        group_repo::NewGroup {
            group_id: &group_id,
            festival_id,
            name,
            password,
            winning_criteria: criteria.as_str(),
            created_by: user_id,
            description: description.map(str::trim).filter(|s| !s.is_empty()),
        },
    )
    .await?;
    group_repo::insert_member(&mut tx, &group_id, user_id).await?;
    tx.commit().await?;

    Ok(group_id)
}

/// Join by festival + group name with an exact password check.
pub async fn join_group(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    name: &str,
    password: Option<&str>,
) -> sqlx::Result<String> {
    let Some(group) = group_repo::load_group_by_name(pool, festival_id, name.trim()).await? else {
        return Err(sqlx::Error::RowNotFound);
    };

    let submitted = password.map(str::trim).filter(|s| !s.is_empty());
    if group.password.as_deref() != submitted {
        return Err(sqlx::Error::Protocol("wrong group password".into()));
    }

    if group_repo::is_member(pool, &group.group_id, user_id).await? {
        return Err(sqlx::Error::Protocol("already a member".into()));
    }

    let mut tx = pool.begin().await?;
    group_repo::insert_member(&mut tx, &group.group_id, user_id).await?;
    tx.commit().await?;

    Ok(group.group_id)
}

pub async fn leave_group(
    pool: &SqlitePool,
    user_id: &str,
    group_id: &str,
) -> sqlx::Result<bool> {
    let removed = group_repo::delete_member(pool, group_id, user_id).await?;
    Ok(removed > 0)
}

pub async fn update_winning_criteria(
    pool: &SqlitePool,
    user_id: &str,
    group_id: &str,
    winning_criteria: &str,
) -> sqlx::Result<()> {
    let Some(criteria) = WinningCriteria::parse(winning_criteria) else {
        return Err(sqlx::Error::Protocol("unknown winning criteria".into()));
    };
    if !group_repo::is_member(pool, group_id, user_id).await? {
        return Err(sqlx::Error::Protocol("not a member of this group".into()));
    }
    group_repo::update_winning_criteria(pool, group_id, criteria.as_str()).await?;
    Ok(())
}

/// Group row, member list and leaderboard; the independent reads run
/// concurrently.
pub async fn load_group_detail(
    pool: &SqlitePool,
    group_id: &str,
) -> sqlx::Result<Option<GroupDetailView>> {
    let Some(group) = group_repo::load_group(pool, group_id).await? else {
        return Ok(None);
    };

    let (members, leaderboard) = tokio::try_join!(
        group_repo::list_members(pool, group_id),
        leaderboard_service::load_leaderboard_for_group(pool, &group),
    )?;

    let members = members
        .into_iter()
        .map(|m| GroupMemberView {
            display_name: resolve_member_name(m.username.as_deref(), m.full_name.as_deref()),
            user_id: m.user_id,
            avatar_url: m.avatar_url,
            joined_at: m.joined_at,
        })
        .collect();

    Ok(Some(GroupDetailView {
        group_id: group.group_id,
        festival_id: group.festival_id,
        name: group.name,
        description: group.description,
        winning_criteria: group.winning_criteria,
        created_by: group.created_by,
        members,
        leaderboard,
    }))
}

pub async fn load_group(pool: &SqlitePool, group_id: &str) -> sqlx::Result<Option<GroupRow>> {
    group_repo::load_group(pool, group_id).await
}

fn resolve_member_name(username: Option<&str>, full_name: Option<&str>) -> String {
    username
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| full_name.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or("Unknown User")
        .to_string()
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
        sqlx::query(
            "INSERT INTO festivals (festival_id, name, start_date, end_date, timezone, status, is_active)
             VALUES ('f1', 'Oktoberfest 2024', '2024-09-20', '2024-10-06', 'Europe/Berlin', 'active', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn create_adds_the_creator_as_member() {
        let pool = test_pool().await;
        let group_id = create_group_with_member(
            &pool,
            "u1",
            "f1",
            "Prost Pros",
            Some("secret"),
            "total_beers",
            None,
        )
        .await
        .unwrap();

        assert!(group_repo::is_member(&pool, &group_id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn join_checks_the_password_exactly() {
        let pool = test_pool().await;
        create_group_with_member(
            &pool,
            "u1",
            "f1",
            "Prost Pros",
            Some("secret"),
            "total_beers",
            None,
        )
        .await
        .unwrap();

        assert!(join_group(&pool, "u2", "f1", "Prost Pros", Some("wrong"))
            .await
            .is_err());
        assert!(join_group(&pool, "u2", "f1", "Prost Pros", None)
            .await
            .is_err());

        let group_id = join_group(&pool, "u2", "f1", "Prost Pros", Some("secret"))
            .await
            .unwrap();
        assert!(group_repo::is_member(&pool, &group_id, "u2").await.unwrap());

        // Joining twice is rejected.
        assert!(join_group(&pool, "u2", "f1", "Prost Pros", Some("secret"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn duplicate_group_names_per_festival_are_rejected() {
        let pool = test_pool().await;
        create_group_with_member(&pool, "u1", "f1", "Prost Pros", None, "total_beers", None)
            .await
            .unwrap();
        assert!(
            create_group_with_member(&pool, "u2", "f1", "Prost Pros", None, "avg_beers", None)
                .await
                .is_err()
        );
    }
}
