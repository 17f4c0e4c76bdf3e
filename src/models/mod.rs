pub mod achievements;
pub mod attendances;
pub mod festivals;
pub mod groups;
pub mod photos;
pub mod reservations;
pub mod sync_operations;
pub mod tent_visits;
pub mod tents;
pub mod users;

pub use achievements::{AchievementRow, AchievementWithUnlockRow};
pub use attendances::AttendanceRow;
pub use festivals::FestivalRow;
pub use groups::{GroupMemberRow, GroupRow};
pub use photos::GalleryPhotoRow;
pub use reservations::{ReservationRow, ReservationWithTentRow};
pub use sync_operations::SyncOperationRow;
pub use tent_visits::TentVisitWithTentRow;
pub use tents::TentRow;
pub use users::UsersRow;
