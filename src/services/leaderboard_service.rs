use serde::Serialize;
use sqlx::SqlitePool;
use std::cmp::Ordering;

use crate::database::stats_repo;
use crate::database::stats_repo::{MemberStatsRow, ParticipantStatsRow};
use crate::models::GroupRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinningCriteria {
    DaysAttended,
    TotalBeers,
    AvgBeers,
}

impl WinningCriteria {
    pub fn as_str(self) -> &'static str {
        match self {
            WinningCriteria::DaysAttended => "days_attended",
            WinningCriteria::TotalBeers => "total_beers",
            WinningCriteria::AvgBeers => "avg_beers",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "days_attended" => Some(WinningCriteria::DaysAttended),
            "total_beers" => Some(WinningCriteria::TotalBeers),
            "avg_beers" => Some(WinningCriteria::AvgBeers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntryView {
    pub position: i64,
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub days_attended: i64,
    pub total_beers: i64,
    pub avg_beers: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardView {
    pub winning_criteria: String,
    pub entries: Vec<LeaderboardEntryView>,
}

#[derive(Serialize)]
pub struct UserStatsWithPositionsView {
    pub user_id: String,
    pub days_attended: i64,
    pub total_beers: i64,
    pub avg_beers: f64,
    pub total_cost: Option<f64>,
    pub position_by_days: Option<i64>,
    pub position_by_total: Option<i64>,
    pub position_by_avg: Option<i64>,
}

pub async fn load_leaderboard_for_group(
    pool: &SqlitePool,
    group: &GroupRow,
) -> sqlx::Result<LeaderboardView> {
    let criteria =
        WinningCriteria::parse(&group.winning_criteria).unwrap_or(WinningCriteria::TotalBeers);
    let stats =
        stats_repo::list_group_member_stats(pool, &group.group_id, &group.festival_id).await?;
    Ok(build_leaderboard(stats, criteria))
}

/// Rank members under the group's winning criteria. Ties break on total
/// beers, then username, so positions are stable across refreshes.
pub fn build_leaderboard(stats: Vec<MemberStatsRow>, criteria: WinningCriteria) -> LeaderboardView {
    let mut entries: Vec<LeaderboardEntryView> = stats
        .into_iter()
        .map(|s| LeaderboardEntryView {
            position: 0,
            display_name: resolve_name(s.username.as_deref(), s.full_name.as_deref()),
            user_id: s.user_id,
            avatar_url: s.avatar_url,
            days_attended: s.days_attended,
            total_beers: s.total_beers,
            avg_beers: average(s.total_beers, s.days_attended),
        })
        .collect();

    entries.sort_by(|a, b| compare_entries(a, b, criteria));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.position = (i + 1) as i64;
    }

    LeaderboardView {
        winning_criteria: criteria.as_str().to_string(),
        entries,
    }
}

fn compare_entries(
    a: &LeaderboardEntryView,
    b: &LeaderboardEntryView,
    criteria: WinningCriteria,
) -> Ordering {
    let primary = match criteria {
        WinningCriteria::DaysAttended => b.days_attended.cmp(&a.days_attended),
        WinningCriteria::TotalBeers => b.total_beers.cmp(&a.total_beers),
        WinningCriteria::AvgBeers => b
            .avg_beers
            .partial_cmp(&a.avg_beers)
            .unwrap_or(Ordering::Equal),
    };
    primary
        .then(b.total_beers.cmp(&a.total_beers))
        .then(a.display_name.cmp(&b.display_name))
}

/// A user's festival aggregates plus their 1-based position among all
/// participants under each of the three criteria.
pub async fn load_user_stats_with_positions(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    custom_beer_cost: Option<f64>,
) -> sqlx::Result<UserStatsWithPositionsView> {
    let participants = stats_repo::list_festival_participant_stats(pool, festival_id).await?;
    Ok(build_stats_with_positions(
        participants,
        user_id,
        custom_beer_cost,
    ))
}

pub fn build_stats_with_positions(
    participants: Vec<ParticipantStatsRow>,
    user_id: &str,
    custom_beer_cost: Option<f64>,
) -> UserStatsWithPositionsView {
    let mine = participants.iter().find(|p| p.user_id == user_id);
    let (days, total) = mine
        .map(|p| (p.days_attended, p.total_beers))
        .unwrap_or((0, 0));
    let avg = average(total, days);

    let position_of = |criteria: WinningCriteria| -> Option<i64> {
        mine?;
        let mut ranked: Vec<&ParticipantStatsRow> = participants.iter().collect();
        ranked.sort_by(|a, b| compare_participants(a, b, criteria));
        ranked
            .iter()
            .position(|p| p.user_id == user_id)
            .map(|i| (i + 1) as i64)
    };

    UserStatsWithPositionsView {
        user_id: user_id.to_string(),
        days_attended: days,
        total_beers: total,
        avg_beers: avg,
        total_cost: custom_beer_cost.map(|cost| cost * total as f64),
        position_by_days: position_of(WinningCriteria::DaysAttended),
        position_by_total: position_of(WinningCriteria::TotalBeers),
        position_by_avg: position_of(WinningCriteria::AvgBeers),
    }
}

fn compare_participants(
    a: &ParticipantStatsRow,
    b: &ParticipantStatsRow,
    criteria: WinningCriteria,
) -> Ordering {
    let avg_a = average(a.total_beers, a.days_attended);
    let avg_b = average(b.total_beers, b.days_attended);
    let primary = match criteria {
        WinningCriteria::DaysAttended => b.days_attended.cmp(&a.days_attended),
        WinningCriteria::TotalBeers => b.total_beers.cmp(&a.total_beers),
        WinningCriteria::AvgBeers => avg_b.partial_cmp(&avg_a).unwrap_or(Ordering::Equal),
    };
    primary
        .then(b.total_beers.cmp(&a.total_beers))
        .then(a.user_id.cmp(&b.user_id))
}

fn average(total: i64, days: i64) -> f64 {
    if days <= 0 {
        0.0
    } else {
        total as f64 / days as f64
    }
}

fn resolve_name(username: Option<&str>, full_name: Option<&str>) -> String {
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

    fn member(user: &str, days: i64, beers: i64) -> MemberStatsRow {
        MemberStatsRow {
            user_id: user.to_string(),
            username: Some(user.to_string()),
            full_name: None,
            avatar_url: None,
            days_attended: days,
            total_beers: beers,
        }
    }

    #[test]
    fn ranks_by_total_beers() {
        let board = build_leaderboard(
            vec![member("anna", 2, 5), member("ben", 3, 9), member("carla", 1, 7)],
            WinningCriteria::TotalBeers,
        );
        let order: Vec<_> = board.entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["ben", "carla", "anna"]);
        assert_eq!(board.entries[0].position, 1);
        assert_eq!(board.entries[2].position, 3);
    }

    #[test]
    fn ranks_by_days_attended() {
        let board = build_leaderboard(
            vec![member("anna", 2, 20), member("ben", 4, 4)],
            WinningCriteria::DaysAttended,
        );
        assert_eq!(board.entries[0].user_id, "ben");
    }

    #[test]
    fn ranks_by_average_with_zero_days_safe() {
        let board = build_leaderboard(
            vec![member("anna", 2, 8), member("ben", 0, 0), member("carla", 4, 12)],
            WinningCriteria::AvgBeers,
        );
        // anna 4.0/day beats carla 3.0/day; ben (no days) is last.
        let order: Vec<_> = board.entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["anna", "carla", "ben"]);
        assert_eq!(board.entries[2].avg_beers, 0.0);
    }

    #[test]
    fn ties_break_on_total_then_name() {
        let board = build_leaderboard(
            vec![member("zoe", 2, 6), member("abe", 2, 6)],
            WinningCriteria::DaysAttended,
        );
        assert_eq!(board.entries[0].user_id, "abe");
    }

    #[test]
    fn positions_cover_all_three_criteria() {
        let participants = vec![
            ParticipantStatsRow {
                user_id: "u1".to_string(),
                username: Some("anna".to_string()),
                days_attended: 2,
                total_beers: 10,
            },
            ParticipantStatsRow {
                user_id: "u2".to_string(),
                username: Some("ben".to_string()),
                days_attended: 4,
                total_beers: 12,
            },
        ];

        let view = build_stats_with_positions(participants, "u1", Some(13.5));
        assert_eq!(view.position_by_days, Some(2));
        assert_eq!(view.position_by_total, Some(2));
        // 5.0/day beats 3.0/day.
        assert_eq!(view.position_by_avg, Some(1));
        assert_eq!(view.total_cost, Some(135.0));
    }

    #[test]
    fn no_positions_without_any_attendance() {
        let view = build_stats_with_positions(Vec::new(), "u1", None);
        assert_eq!(view.days_attended, 0);
        assert_eq!(view.position_by_days, None);
        assert_eq!(view.total_cost, None);
    }
}
