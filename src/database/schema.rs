use sqlx::SqlitePool;

// Idempotent bootstrap, run at startup and from test setups.
const SQL_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS festivals (
  festival_id TEXT PRIMARY KEY,
  name        TEXT NOT NULL,
  location    TEXT,
  start_date  TEXT NOT NULL,
  end_date    TEXT NOT NULL,
  timezone    TEXT NOT NULL DEFAULT 'Europe/Berlin',
  status      TEXT NOT NULL DEFAULT 'upcoming',
  is_active   INTEGER NOT NULL DEFAULT 0
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS users (
  user_id          TEXT PRIMARY KEY,
  username         TEXT,
  full_name        TEXT,
  avatar_url       TEXT,
  custom_beer_cost REAL,
  created_at       TEXT DEFAULT (datetime('now'))
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS current_user (
  user_id TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS attendances (
  attendance_id TEXT PRIMARY KEY,
  user_id       TEXT NOT NULL,
  festival_id   TEXT NOT NULL,
  date          TEXT NOT NULL,
  beer_count    INTEGER NOT NULL DEFAULT 0,
  created_at    TEXT DEFAULT (datetime('now')),
  UNIQUE (user_id, festival_id, date)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS tents (
  tent_id  TEXT PRIMARY KEY,
  name     TEXT NOT NULL,
  category TEXT
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS tent_visits (
  visit_id    TEXT PRIMARY KEY,
  user_id     TEXT NOT NULL,
  festival_id TEXT NOT NULL,
  tent_id     TEXT NOT NULL,
  visited_at  TEXT
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS reservations (
  reservation_id          TEXT PRIMARY KEY,
  user_id                 TEXT NOT NULL,
  festival_id             TEXT NOT NULL,
  tent_id                 TEXT NOT NULL,
  start_at                TEXT NOT NULL,
  end_at                  TEXT,
  reminder_offset_minutes INTEGER,
  status                  TEXT NOT NULL DEFAULT 'active'
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS groups (
  group_id         TEXT PRIMARY KEY,
  festival_id      TEXT NOT NULL,
  name             TEXT NOT NULL,
  password         TEXT,
  winning_criteria TEXT NOT NULL DEFAULT 'total_beers',
  created_by       TEXT NOT NULL,
  description      TEXT,
  created_at       TEXT DEFAULT (datetime('now')),
  UNIQUE (festival_id, name)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS group_members (
  group_id  TEXT NOT NULL,
  user_id   TEXT NOT NULL,
  joined_at TEXT DEFAULT (datetime('now')),
  UNIQUE (group_id, user_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS photos (
  photo_id    TEXT PRIMARY KEY,
  user_id     TEXT NOT NULL,
  festival_id TEXT NOT NULL,
  picture_url TEXT NOT NULL,
  taken_on    TEXT NOT NULL,
  created_at  TEXT DEFAULT (datetime('now'))
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS achievements (
  achievement_id TEXT PRIMARY KEY,
  name           TEXT NOT NULL,
  description    TEXT,
  rarity         TEXT NOT NULL DEFAULT 'common',
  points         INTEGER NOT NULL DEFAULT 0,
  metric         TEXT NOT NULL,
  threshold      INTEGER NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS user_achievements (
  user_id        TEXT NOT NULL,
  achievement_id TEXT NOT NULL,
  festival_id    TEXT NOT NULL,
  unlocked_at    TEXT DEFAULT (datetime('now')),
  UNIQUE (user_id, achievement_id, festival_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS sync_operations (
  id          TEXT PRIMARY KEY,
  table_name  TEXT NOT NULL,
  operation   TEXT NOT NULL,
  payload     TEXT NOT NULL,
  status      TEXT NOT NULL DEFAULT 'pending',
  retry_count INTEGER NOT NULL DEFAULT 0,
  last_error  TEXT,
  created_at  TEXT DEFAULT (datetime('now'))
)
"#,
];

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for stmt in SQL_SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
