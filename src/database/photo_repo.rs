use sqlx::SqlitePool;

use crate::models::GalleryPhotoRow;

pub struct NewPhoto<'a> {
    pub photo_id: &'a str,
    pub user_id: &'a str,
    pub festival_id: &'a str,
    pub picture_url: &'a str,
    pub taken_on: &'a str,
}

const SQL_INSERT_PHOTO: &str = r#"
INSERT INTO photos (photo_id, user_id, festival_id, picture_url, taken_on)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub async fn insert_photo(pool: &SqlitePool, photo: NewPhoto<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_PHOTO)
        .bind(photo.photo_id)
        .bind(photo.user_id)
        .bind(photo.festival_id)
        .bind(photo.picture_url)
        .bind(photo.taken_on)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_PICTURE_URL: &str = r#"
SELECT picture_url
FROM photos
WHERE photo_id = ?
"#;

pub async fn load_picture_url(
    pool: &SqlitePool,
    photo_id: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar(SQL_LOAD_PICTURE_URL)
        .bind(photo_id)
        .fetch_optional(pool)
        .await
}

// Source order is chronological per uploader; the gallery grouping
// relies on it and does not re-sort.
const SQL_LIST_FOR_GROUP: &str = r#"
SELECT
  p.photo_id,
  p.user_id,
  u.username,
  u.full_name,
  u.avatar_url,
  p.picture_url,
  p.taken_on,
  p.created_at
FROM photos p
LEFT JOIN users u ON u.user_id = p.user_id
JOIN group_members gm ON gm.user_id = p.user_id
WHERE gm.group_id = ? AND p.festival_id = ?
ORDER BY p.created_at ASC
"#;

pub async fn list_for_group(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<GalleryPhotoRow>> {
    sqlx::query_as::<_, GalleryPhotoRow>(SQL_LIST_FOR_GROUP)
        .bind(group_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}
