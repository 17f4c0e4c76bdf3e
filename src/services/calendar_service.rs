use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::warn;

use crate::database::{attendance_repo, festival_repo, reservation_repo, tent_visit_repo};
use crate::models::{AttendanceRow, ReservationWithTentRow, TentVisitWithTentRow};

/// Closed set of inputs the calendar merges into one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    AttendanceSummary,
    TentVisit,
    Reservation,
}

#[derive(Debug, Clone)]
pub struct CalendarActivity {
    pub id: String,
    pub actor_id: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub kind: ActivityKind,
    pub beer_count: i64,
    pub tent_name: Option<String>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    // Daily total shown when the day has no tent visits.
    AttendanceSummary,
    // Daily total shown alongside tent visits when beer was recorded.
    BeerSummary,
    TentVisit,
    Reservation,
}

impl CalendarEventKind {
    fn is_summary(self) -> bool {
        matches!(
            self,
            CalendarEventKind::AttendanceSummary | CalendarEventKind::BeerSummary
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub kind: CalendarEventKind,
    pub id: String,
    pub actor_id: String,
    pub time_label: String,
    pub beer_count: Option<i64>,
    pub tent_name: Option<String>,
    pub end_time_label: Option<String>,
    #[serde(skip_serializing)]
    pub occurred_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CalendarView {
    pub festival_id: String,
    pub timezone: String,
    pub days: BTreeMap<String, Vec<CalendarEvent>>,
}

pub async fn load_personal_calendar(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Option<CalendarView>> {
    let Some(festival) = festival_repo::load_festival(pool, festival_id).await? else {
        return Ok(None);
    };
    let tz = parse_timezone(&festival.timezone);

    let attendances = attendance_repo::list_for_user(pool, user_id, festival_id).await?;
    let visits = tent_visit_repo::list_for_user(pool, user_id, festival_id).await?;
    let reservations =
        reservation_repo::list_with_tent_for_user(pool, user_id, festival_id).await?;

    let activities = collect_activities(&attendances, &visits, &reservations, tz);

    Ok(Some(CalendarView {
        festival_id: festival.festival_id,
        timezone: festival.timezone,
        days: build_day_buckets(activities, tz),
    }))
}

pub async fn load_group_calendar(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Option<CalendarView>> {
    let Some(festival) = festival_repo::load_festival(pool, festival_id).await? else {
        return Ok(None);
    };
    let tz = parse_timezone(&festival.timezone);

    let attendances = attendance_repo::list_for_group(pool, group_id, festival_id).await?;
    let visits = tent_visit_repo::list_for_group(pool, group_id, festival_id).await?;
    let reservations =
        reservation_repo::list_with_tent_for_group(pool, group_id, festival_id).await?;

    let activities = collect_activities(&attendances, &visits, &reservations, tz);

    Ok(Some(CalendarView {
        festival_id: festival.festival_id,
        timezone: festival.timezone,
        days: build_day_buckets(activities, tz),
    }))
}

fn collect_activities(
    attendances: &[AttendanceRow],
    visits: &[TentVisitWithTentRow],
    reservations: &[ReservationWithTentRow],
    tz: Tz,
) -> Vec<CalendarActivity> {
    let mut out = Vec::new();

    for a in attendances {
        out.push(CalendarActivity {
            id: a.attendance_id.clone(),
            actor_id: a.user_id.clone(),
            occurred_at: local_date_to_instant(&a.date, tz),
            kind: ActivityKind::AttendanceSummary,
            beer_count: a.beer_count,
            tent_name: None,
            ends_at: None,
        });
    }

    for v in visits {
        out.push(CalendarActivity {
            id: v.visit_id.clone(),
            actor_id: v.user_id.clone(),
            occurred_at: parse_timestamp(v.visited_at.as_deref()),
            kind: ActivityKind::TentVisit,
            beer_count: 0,
            tent_name: v.tent_name.clone(),
            ends_at: None,
        });
    }

    for r in reservations {
        out.push(CalendarActivity {
            id: r.reservation_id.clone(),
            actor_id: r.user_id.clone(),
            occurred_at: parse_timestamp(Some(&r.start_at)),
            kind: ActivityKind::Reservation,
            beer_count: 0,
            tent_name: r.tent_name.clone(),
            ends_at: r.end_at.as_deref().and_then(|s| parse_timestamp(Some(s))),
        });
    }

    out
}

/// Merge heterogeneous activities into per-day buckets keyed by the
/// festival-local date. Pure transform; policy lives here, fetching does not.
pub fn build_day_buckets(
    activities: Vec<CalendarActivity>,
    tz: Tz,
) -> BTreeMap<String, Vec<CalendarEvent>> {
    // Bad timestamps are dropped, never fatal.
    let mut by_day: BTreeMap<String, Vec<(CalendarActivity, DateTime<Utc>)>> = BTreeMap::new();
    for activity in activities {
        let Some(at) = activity.occurred_at else {
            continue;
        };
        by_day
            .entry(local_date_key(at, tz))
            .or_default()
            .push((activity, at));
    }

    let mut buckets = BTreeMap::new();
    for (date_key, day) in by_day {
        let mut events = Vec::new();

        // The summary/tent-visit policy applies per actor: one member's tent
        // visits never suppress another member's daily total.
        let mut actor_order: Vec<&str> = Vec::new();
        for (activity, _) in &day {
            if !actor_order.iter().any(|a| *a == activity.actor_id) {
                actor_order.push(&activity.actor_id);
            }
        }

        for actor_id in actor_order {
            let summaries: Vec<_> = day
                .iter()
                .filter(|(a, _)| a.actor_id == actor_id && a.kind == ActivityKind::AttendanceSummary)
                .collect();
            let tent_visits: Vec<_> = day
                .iter()
                .filter(|(a, _)| a.actor_id == actor_id && a.kind == ActivityKind::TentVisit)
                .collect();
            let reservations: Vec<_> = day
                .iter()
                .filter(|(a, _)| a.actor_id == actor_id && a.kind == ActivityKind::Reservation)
                .collect();

            let beer_total: i64 = summaries.iter().map(|(a, _)| a.beer_count).sum();

            if tent_visits.is_empty() {
                // (a) no tent visits: the plain daily summary stands alone.
                for (a, at) in &summaries {
                    events.push(make_event(CalendarEventKind::AttendanceSummary, a, *at, tz));
                }
            } else {
                // (b)/(c) tent visits explain the day; the generic total only
                // reappears, relabelled, when beer was actually recorded.
                for (a, at) in &tent_visits {
                    events.push(make_event(CalendarEventKind::TentVisit, a, *at, tz));
                }
                if beer_total > 0 {
                    if let Some((a, at)) = summaries.first() {
                        let mut event = make_event(CalendarEventKind::BeerSummary, a, *at, tz);
                        event.beer_count = Some(beer_total);
                        events.push(event);
                    }
                }
            }

            for (a, at) in &reservations {
                events.push(make_event(CalendarEventKind::Reservation, a, *at, tz));
            }
        }

        // Summaries anchor the day regardless of their nominal time; the rest
        // runs in ascending time order.
        events.sort_by(|a, b| {
            b.kind
                .is_summary()
                .cmp(&a.kind.is_summary())
                .then(a.occurred_at.cmp(&b.occurred_at))
        });

        buckets.insert(date_key, events);
    }

    buckets
}

fn make_event(
    kind: CalendarEventKind,
    activity: &CalendarActivity,
    at: DateTime<Utc>,
    tz: Tz,
) -> CalendarEvent {
    CalendarEvent {
        kind,
        id: activity.id.clone(),
        actor_id: activity.actor_id.clone(),
        time_label: at.with_timezone(&tz).format("%H:%M").to_string(),
        beer_count: match kind {
            CalendarEventKind::AttendanceSummary | CalendarEventKind::BeerSummary => {
                Some(activity.beer_count)
            }
            _ => None,
        },
        tent_name: activity.tent_name.clone(),
        end_time_label: activity
            .ends_at
            .map(|e| e.with_timezone(&tz).format("%H:%M").to_string()),
        occurred_at: at,
    }
}

pub fn parse_timezone(raw: &str) -> Tz {
    match raw.parse() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("Unknown festival timezone '{}', falling back to UTC", raw);
            chrono_tz::UTC
        }
    }
}

pub fn local_date_key(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d").to_string()
}

// ISO-ish strings with or without an offset; anything else is dropped.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Sqlite's datetime('now') format: "2024-09-21 18:00:00" (UTC).
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

// Attendance rows carry a festival-local date, not an instant. Pin them to
// local noon so bucketing lands them on their own day in any zone.
fn local_date_to_instant(date: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let local = date.and_hms_opt(12, 0, 0)?;
    tz.from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> Tz {
        "Europe/Berlin".parse().unwrap()
    }

    fn at(raw: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(Some(raw))
    }

    fn summary(id: &str, actor: &str, raw: &str, beers: i64) -> CalendarActivity {
        CalendarActivity {
            id: id.to_string(),
            actor_id: actor.to_string(),
            occurred_at: at(raw),
            kind: ActivityKind::AttendanceSummary,
            beer_count: beers,
            tent_name: None,
            ends_at: None,
        }
    }

    fn visit(id: &str, actor: &str, raw: &str, tent: &str) -> CalendarActivity {
        CalendarActivity {
            id: id.to_string(),
            actor_id: actor.to_string(),
            occurred_at: at(raw),
            kind: ActivityKind::TentVisit,
            beer_count: 0,
            tent_name: Some(tent.to_string()),
            ends_at: None,
        }
    }

    fn reservation(id: &str, actor: &str, raw: &str) -> CalendarActivity {
        CalendarActivity {
            id: id.to_string(),
            actor_id: actor.to_string(),
            occurred_at: at(raw),
            kind: ActivityKind::Reservation,
            beer_count: 0,
            tent_name: None,
            ends_at: None,
        }
    }

    #[test]
    fn buckets_use_the_local_date_not_the_utc_date() {
        // 00:30 local on Sept 21 in Berlin is 22:30 UTC on Sept 20; the
        // local and UTC dates disagree and the bucket must be the local one.
        let buckets = build_day_buckets(
            vec![visit("t1", "u1", "2024-09-21T00:30:00+02:00", "Hofbräu")],
            berlin(),
        );
        assert_eq!(buckets.len(), 1);
        assert!(buckets.contains_key("2024-09-21"));
    }

    #[test]
    fn summary_alone_when_no_tent_visits() {
        let buckets = build_day_buckets(
            vec![summary("a1", "u1", "2024-09-21T12:00:00+02:00", 4)],
            berlin(),
        );
        let day = &buckets["2024-09-21"];
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].kind, CalendarEventKind::AttendanceSummary);
        assert_eq!(day[0].beer_count, Some(4));
    }

    #[test]
    fn tent_visits_suppress_the_summary_when_no_beer() {
        let buckets = build_day_buckets(
            vec![
                summary("a1", "u1", "2024-09-21T12:00:00+02:00", 0),
                visit("t1", "u1", "2024-09-21T20:00:00+02:00", "Hofbräu"),
            ],
            berlin(),
        );
        let day = &buckets["2024-09-21"];
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].kind, CalendarEventKind::TentVisit);
    }

    #[test]
    fn beer_summary_coexists_with_tent_visits() {
        // The example scenario: tent visit plus a nonzero daily total.
        let buckets = build_day_buckets(
            vec![
                summary("a1", "u1", "2024-09-21T23:40:00+02:00", 3),
                visit("t1", "u1", "2024-09-21T20:00:00+02:00", "Hofbräu"),
            ],
            berlin(),
        );
        assert_eq!(buckets.len(), 1);
        let day = &buckets["2024-09-21"];
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].kind, CalendarEventKind::BeerSummary);
        assert_eq!(day[0].beer_count, Some(3));
        assert_eq!(day[1].kind, CalendarEventKind::TentVisit);
    }

    #[test]
    fn summaries_sort_first_regardless_of_time() {
        let buckets = build_day_buckets(
            vec![
                visit("t1", "u1", "2024-09-21T10:00:00+02:00", "Augustiner"),
                summary("a1", "u1", "2024-09-21T23:59:00+02:00", 2),
                reservation("r1", "u1", "2024-09-21T09:00:00+02:00"),
            ],
            berlin(),
        );
        let day = &buckets["2024-09-21"];
        assert_eq!(day[0].kind, CalendarEventKind::BeerSummary);
        // Non-summary events keep ascending time order.
        assert_eq!(day[1].kind, CalendarEventKind::Reservation);
        assert_eq!(day[2].kind, CalendarEventKind::TentVisit);
    }

    #[test]
    fn bad_timestamps_are_dropped_not_fatal() {
        let mut broken = visit("t1", "u1", "2024-09-21T20:00:00+02:00", "Hofbräu");
        broken.occurred_at = None;
        let buckets = build_day_buckets(
            vec![broken, summary("a1", "u1", "2024-09-22T12:00:00+02:00", 1)],
            berlin(),
        );
        assert_eq!(buckets.len(), 1);
        assert!(buckets.contains_key("2024-09-22"));
    }

    #[test]
    fn policy_applies_per_actor_in_group_view() {
        // u1 has tent visits and beer, u2 only a summary. u2's total must
        // not be suppressed by u1's visits.
        let buckets = build_day_buckets(
            vec![
                summary("a1", "u1", "2024-09-21T12:00:00+02:00", 3),
                visit("t1", "u1", "2024-09-21T20:00:00+02:00", "Hofbräu"),
                summary("a2", "u2", "2024-09-21T12:00:00+02:00", 5),
            ],
            berlin(),
        );
        let day = &buckets["2024-09-21"];
        assert_eq!(day.len(), 3);
        let kinds: Vec<_> = day.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&CalendarEventKind::BeerSummary));
        assert!(kinds.contains(&CalendarEventKind::AttendanceSummary));
        assert!(kinds.contains(&CalendarEventKind::TentVisit));
        // Both summaries anchor the day.
        assert!(day[0].kind.is_summary());
        assert!(day[1].kind.is_summary());
    }

    #[test]
    fn sparse_buckets_only() {
        let buckets = build_day_buckets(
            vec![
                summary("a1", "u1", "2024-09-20T12:00:00+02:00", 1),
                summary("a2", "u1", "2024-09-23T12:00:00+02:00", 2),
            ],
            berlin(),
        );
        assert_eq!(
            buckets.keys().cloned().collect::<Vec<_>>(),
            vec!["2024-09-20", "2024-09-23"]
        );
    }

    #[test]
    fn parse_timestamp_accepts_sqlite_format() {
        assert!(parse_timestamp(Some("2024-09-21 18:00:00")).is_some());
        assert!(parse_timestamp(Some("not-a-date")).is_none());
        assert!(parse_timestamp(Some("")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
