use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{GroupMemberRow, GroupRow};

pub struct NewGroup<'a> {
    pub group_id: &'a str,
    pub festival_id: &'a str,
    pub name: &'a str,
    pub password: Option<&'a str>,
    pub winning_criteria: &'a str,
    pub created_by: &'a str,
    pub description: Option<&'a str>,
}

const SQL_INSERT_GROUP: &str = r#"
INSERT INTO groups (
  group_id,
  festival_id,
  name,
  password,
  winning_criteria,
  created_by,
  description
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub async fn insert_group(conn: &mut SqliteConnection, group: NewGroup<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_GROUP)
        .bind(group.group_id)
        .bind(group.festival_id)
        .bind(group.name)
        .bind(group.password)
        .bind(group.winning_criteria)
        .bind(group.created_by)
        .bind(group.description)
        .execute(conn)
        .await?;
    Ok(())
}

const SQL_LOAD_GROUP: &str = r#"
SELECT
  group_id,
  festival_id,
  name,
  password,
  winning_criteria,
  created_by,
  description,
  created_at
FROM groups
WHERE group_id = ?
"#;

pub async fn load_group(pool: &SqlitePool, group_id: &str) -> sqlx::Result<Option<GroupRow>> {
    sqlx::query_as::<_, GroupRow>(SQL_LOAD_GROUP)
        .bind(group_id)
        .fetch_optional(pool)
        .await
}

const SQL_LOAD_GROUP_BY_NAME: &str = r#"
SELECT
  group_id,
  festival_id,
  name,
  password,
  winning_criteria,
  created_by,
  description,
  created_at
FROM groups
WHERE festival_id = ? AND name = ?
"#;

pub async fn load_group_by_name(
    pool: &SqlitePool,
    festival_id: &str,
    name: &str,
) -> sqlx::Result<Option<GroupRow>> {
    sqlx::query_as::<_, GroupRow>(SQL_LOAD_GROUP_BY_NAME)
        .bind(festival_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_MEMBER: &str = r#"
INSERT INTO group_members (group_id, user_id)
VALUES (?1, ?2)
"#;

pub async fn insert_member(
    conn: &mut SqliteConnection,
    group_id: &str,
    user_id: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_MEMBER)
        .bind(group_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

const SQL_DELETE_MEMBER: &str = r#"
DELETE FROM group_members
WHERE group_id = ? AND user_id = ?
"#;

pub async fn delete_member(
    pool: &SqlitePool,
    group_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_MEMBER)
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_IS_MEMBER: &str = r#"
SELECT COUNT(*)
FROM group_members
WHERE group_id = ? AND user_id = ?
"#;

pub async fn is_member(pool: &SqlitePool, group_id: &str, user_id: &str) -> sqlx::Result<bool> {
    let count: i64 = sqlx::query_scalar(SQL_IS_MEMBER)
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

const SQL_LIST_MEMBERS: &str = r#"
SELECT
  gm.group_id,
  gm.user_id,
  u.username,
  u.full_name,
  u.avatar_url,
  gm.joined_at
FROM group_members gm
LEFT JOIN users u ON u.user_id = gm.user_id
WHERE gm.group_id = ?
ORDER BY gm.joined_at ASC
"#;

pub async fn list_members(pool: &SqlitePool, group_id: &str) -> sqlx::Result<Vec<GroupMemberRow>> {
    sqlx::query_as::<_, GroupMemberRow>(SQL_LIST_MEMBERS)
        .bind(group_id)
        .fetch_all(pool)
        .await
}

const SQL_UPDATE_CRITERIA: &str = r#"
UPDATE groups
SET winning_criteria = ?
WHERE group_id = ?
"#;

pub async fn update_winning_criteria(
    pool: &SqlitePool,
    group_id: &str,
    winning_criteria: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_CRITERIA)
        .bind(winning_criteria)
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
