use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserStatsRow {
    pub days_attended: i64,
    pub total_beers: i64,
    pub distinct_tents: i64,
    pub photos_uploaded: i64,
}

const SQL_USER_STATS: &str = r#"
SELECT
  (SELECT COUNT(DISTINCT date) FROM attendances
     WHERE user_id = ?1 AND festival_id = ?2) AS days_attended,
  (SELECT COALESCE(SUM(beer_count), 0) FROM attendances
     WHERE user_id = ?1 AND festival_id = ?2) AS total_beers,
  (SELECT COUNT(DISTINCT tent_id) FROM tent_visits
     WHERE user_id = ?1 AND festival_id = ?2) AS distinct_tents,
  (SELECT COUNT(*) FROM photos
     WHERE user_id = ?1 AND festival_id = ?2) AS photos_uploaded
"#;

pub async fn load_user_stats(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<UserStatsRow> {
    sqlx::query_as::<_, UserStatsRow>(SQL_USER_STATS)
        .bind(user_id)
        .bind(festival_id)
        .fetch_one(pool)
        .await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberStatsRow {
    pub user_id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub days_attended: i64,
    pub total_beers: i64,
}

const SQL_GROUP_MEMBER_STATS: &str = r#"
SELECT
  gm.user_id,
  u.username,
  u.full_name,
  u.avatar_url,
  COUNT(DISTINCT a.date) AS days_attended,
  COALESCE(SUM(a.beer_count), 0) AS total_beers
FROM group_members gm
LEFT JOIN users u ON u.user_id = gm.user_id
LEFT JOIN attendances a
  ON a.user_id = gm.user_id AND a.festival_id = ?2
WHERE gm.group_id = ?1
GROUP BY gm.user_id
"#;

pub async fn list_group_member_stats(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<MemberStatsRow>> {
    sqlx::query_as::<_, MemberStatsRow>(SQL_GROUP_MEMBER_STATS)
        .bind(group_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantStatsRow {
    pub user_id: String,
    pub username: Option<String>,
    pub days_attended: i64,
    pub total_beers: i64,
}

const SQL_FESTIVAL_PARTICIPANT_STATS: &str = r#"
SELECT
  a.user_id,
  u.username,
  COUNT(DISTINCT a.date) AS days_attended,
  COALESCE(SUM(a.beer_count), 0) AS total_beers
FROM attendances a
LEFT JOIN users u ON u.user_id = a.user_id
WHERE a.festival_id = ?
GROUP BY a.user_id
"#;

pub async fn list_festival_participant_stats(
    pool: &SqlitePool,
    festival_id: &str,
) -> sqlx::Result<Vec<ParticipantStatsRow>> {
    sqlx::query_as::<_, ParticipantStatsRow>(SQL_FESTIVAL_PARTICIPANT_STATS)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_PARTICIPANT_IDS: &str = r#"
SELECT DISTINCT user_id
FROM attendances
WHERE festival_id = ?
"#;

pub async fn list_participant_ids(
    pool: &SqlitePool,
    festival_id: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(SQL_LIST_PARTICIPANT_IDS)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}
