pub mod achievement_repo;
pub mod attendance_repo;
pub mod current_user_repo;
pub mod festival_repo;
pub mod group_repo;
pub mod photo_repo;
pub mod profile_repo;
pub mod reservation_repo;
pub mod schema;
pub mod stats_repo;
pub mod sync_queue_repo;
pub mod tent_repo;
pub mod tent_visit_repo;
