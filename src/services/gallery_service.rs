use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{festival_repo, photo_repo};
use crate::models::GalleryPhotoRow;
use crate::services::calendar_service::parse_timezone;

#[derive(Debug, Clone, Serialize)]
pub struct GalleryPhotoView {
    pub photo_id: String,
    pub picture_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryUserView {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub photos: Vec<GalleryPhotoView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryDayView {
    pub date: String,
    pub users: Vec<GalleryUserView>,
}

pub async fn load_group_gallery(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<GalleryDayView>> {
    let photos = photo_repo::list_for_group(pool, group_id, festival_id).await?;
    Ok(group_photos_by_day(&photos))
}

/// Group photos by festival-local date (descending), then by uploader in
/// first-appearance order. Photo order within an uploader is the source
/// order; the grouping never re-sorts it.
pub fn group_photos_by_day(photos: &[GalleryPhotoRow]) -> Vec<GalleryDayView> {
    let mut days: Vec<GalleryDayView> = Vec::new();

    for photo in photos {
        let date = photo.taken_on.trim();
        if date.is_empty() {
            continue;
        }

        let day_idx = match days.iter().position(|d| d.date == date) {
            Some(idx) => idx,
            None => {
                days.push(GalleryDayView {
                    date: date.to_string(),
                    users: Vec::new(),
                });
                days.len() - 1
            }
        };
        let day = &mut days[day_idx];

        // Identity is (date, uploader): the same uploader on another date
        // gets an independent group.
        match day.users.iter_mut().find(|u| u.user_id == photo.user_id) {
            Some(user) => user.photos.push(photo_view(photo)),
            None => day.users.push(GalleryUserView {
                user_id: photo.user_id.clone(),
                // Resolved once per group, from the group's first photo.
                display_name: resolve_display_name(photo),
                avatar_url: photo.avatar_url.clone(),
                photos: vec![photo_view(photo)],
            }),
        }
    }

    // Most recent festival day first; the calendar sorts the other way.
    days.sort_by(|a, b| b.date.cmp(&a.date));
    days
}

fn photo_view(photo: &GalleryPhotoRow) -> GalleryPhotoView {
    GalleryPhotoView {
        photo_id: photo.photo_id.clone(),
        picture_url: photo.picture_url.clone(),
    }
}

fn resolve_display_name(photo: &GalleryPhotoRow) -> String {
    photo
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            photo
                .full_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("Unknown User")
        .to_string()
}

pub async fn record_photo(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    picture_url: &str,
) -> sqlx::Result<String> {
    let picture_url = picture_url.trim();
    if picture_url.is_empty() {
        return Err(sqlx::Error::Protocol("picture_url is required".into()));
    }

    let Some(festival) = festival_repo::load_festival(pool, festival_id).await? else {
        return Err(sqlx::Error::RowNotFound);
    };
    let tz = parse_timezone(&festival.timezone);

    // Photos bucket under the festival-local day of upload.
    let taken_on = chrono::Utc::now()
        .with_timezone(&tz)
        .format("%Y-%m-%d")
        .to_string();

    let photo_id = Uuid::new_v4().to_string();
    photo_repo::insert_photo(
        pool,
        photo_repo::NewPhoto {
            photo_id: &photo_id,
            user_id,
            festival_id,
            picture_url,
            taken_on: &taken_on,
        },
    )
    .await?;

    Ok(photo_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(
        id: &str,
        user: &str,
        username: Option<&str>,
        full_name: Option<&str>,
        date: &str,
    ) -> GalleryPhotoRow {
        GalleryPhotoRow {
            photo_id: id.to_string(),
            user_id: user.to_string(),
            username: username.map(|s| s.to_string()),
            full_name: full_name.map(|s| s.to_string()),
            avatar_url: None,
            picture_url: format!("https://storage.local/{}.jpg", id),
            taken_on: date.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn groups_by_date_descending() {
        let rows = vec![
            photo("p1", "u1", Some("anna"), None, "2024-09-20"),
            photo("p2", "u1", Some("anna"), None, "2024-09-22"),
            photo("p3", "u2", Some("ben"), None, "2024-09-21"),
        ];
        let days = group_photos_by_day(&rows);
        let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-09-22", "2024-09-21", "2024-09-20"]);
    }

    #[test]
    fn same_uploader_on_two_dates_gets_independent_groups() {
        let rows = vec![
            photo("p1", "u1", Some("anna"), None, "2024-09-20"),
            photo("p2", "u1", Some("anna"), None, "2024-09-21"),
        ];
        let days = group_photos_by_day(&rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].users.len(), 1);
        assert_eq!(days[1].users.len(), 1);
        assert_eq!(days[0].users[0].photos.len(), 1);
    }

    #[test]
    fn photos_keep_source_order_within_an_uploader() {
        let rows = vec![
            photo("p1", "u1", Some("anna"), None, "2024-09-20"),
            photo("p2", "u2", Some("ben"), None, "2024-09-20"),
            photo("p3", "u1", Some("anna"), None, "2024-09-20"),
        ];
        let days = group_photos_by_day(&rows);
        assert_eq!(days.len(), 1);
        let anna = &days[0].users[0];
        assert_eq!(anna.user_id, "u1");
        let ids: Vec<_> = anna.photos.iter().map(|p| p.photo_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        // Uploaders appear in first-appearance order.
        assert_eq!(days[0].users[1].user_id, "u2");
    }

    #[test]
    fn display_name_precedence() {
        let rows = vec![
            photo("p1", "u1", Some("anna"), Some("Anna A"), "2024-09-20"),
            photo("p2", "u2", None, Some("Ben B"), "2024-09-20"),
            photo("p3", "u3", None, None, "2024-09-20"),
            photo("p4", "u4", Some("   "), Some("Carla C"), "2024-09-20"),
        ];
        let days = group_photos_by_day(&rows);
        let names: Vec<_> = days[0]
            .users
            .iter()
            .map(|u| u.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["anna", "Ben B", "Unknown User", "Carla C"]);
    }

    #[test]
    fn grouping_is_deterministic() {
        let rows = vec![
            photo("p1", "u1", Some("anna"), None, "2024-09-21"),
            photo("p2", "u2", Some("ben"), None, "2024-09-20"),
            photo("p3", "u1", Some("anna"), None, "2024-09-20"),
            photo("p4", "u2", Some("ben"), None, "2024-09-21"),
        ];
        let first = group_photos_by_day(&rows);
        let second = group_photos_by_day(&rows);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.users.len(), b.users.len());
            for (ua, ub) in a.users.iter().zip(b.users.iter()) {
                assert_eq!(ua.user_id, ub.user_id);
                assert_eq!(ua.display_name, ub.display_name);
                let ids_a: Vec<_> = ua.photos.iter().map(|p| &p.photo_id).collect();
                let ids_b: Vec<_> = ub.photos.iter().map(|p| &p.photo_id).collect();
                assert_eq!(ids_a, ids_b);
            }
        }
    }
}
