pub mod achievement_service;
pub mod attendance_service;
pub mod calendar_service;
pub mod gallery_service;
pub mod group_service;
pub mod leaderboard_service;
pub mod profile_service;
pub mod reservation_service;
pub mod sync_service;
