/// Photo joined with the uploader's profile, as the gallery consumes it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GalleryPhotoRow {
    pub photo_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture_url: String,
    pub taken_on: String,
    pub created_at: Option<String>,
}
