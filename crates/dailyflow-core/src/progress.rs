//! Progress statistics derived from the activity log.
//!
//! Every figure on the progress page is a fold over [`ActivityEvent`]s; the
//! log itself is an append-only JSON-lines file in the data directory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::datetime::to_local_date;
use crate::storage::{append_jsonl, load_jsonl};
use crate::task::Task;
use crate::task_list::Summary;

pub const ACTIVITY_FILE: &str = "activity.data";
pub const DEFAULT_RANGE_DAYS: i64 = 7;
const EARLY_BIRD_HOUR: u32 = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TaskAdded,
    TaskCompleted,
    TaskReopened,
    TaskDeleted,
    FocusSessionCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEvent {
    pub at: DateTime<Utc>,
    pub kind: ActivityKind,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ActivityEvent {
    pub fn for_task(kind: ActivityKind, task: &Task, at: DateTime<Utc>) -> Self {
        Self {
            at,
            kind,
            task_id: Some(task.id.clone()),
            category: Some(task.category.clone()),
        }
    }

    pub fn focus_session(at: DateTime<Utc>) -> Self {
        Self {
            at,
            kind: ActivityKind::FocusSessionCompleted,
            task_id: None,
            category: None,
        }
    }
}

/// Append-only history. Without a path it lives only in memory.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    path: Option<PathBuf>,
    events: Vec<ActivityEvent>,
}

impl ActivityLog {
    pub fn in_memory() -> Self {
        Self::default()
    }

    #[instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let path = data_dir.join(ACTIVITY_FILE);
        let events = load_jsonl(&path)
            .with_context(|| format!("failed to load activity log {}", path.display()))?;
        info!(count = events.len(), "activity log loaded");
        Ok(Self {
            path: Some(path),
            events,
        })
    }

    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn record(&mut self, event: ActivityEvent) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            append_jsonl(path, &event)?;
        }
        debug!(kind = ?event.kind, "activity recorded");
        self.events.push(event);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStats {
    pub date: NaiveDate,
    pub label: &'static str,
    pub added: u32,
    pub completed: u32,
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    added: u32,
    completed: u32,
}

/// Net per-day counts over the whole log. Reopening a task takes back a
/// completion made the same day.
fn tallies(events: &[ActivityEvent], tz: &Tz) -> BTreeMap<NaiveDate, Tally> {
    let mut by_day: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    for event in events {
        let day = by_day.entry(to_local_date(event.at, tz)).or_default();
        match event.kind {
            ActivityKind::TaskAdded => day.added += 1,
            ActivityKind::TaskCompleted => day.completed += 1,
            ActivityKind::TaskReopened => day.completed = day.completed.saturating_sub(1),
            ActivityKind::TaskDeleted | ActivityKind::FocusSessionCompleted => {}
        }
    }
    by_day
}

/// One entry per day in `start..=end`, including empty days.
pub fn daily_stats(events: &[ActivityEvent], start: NaiveDate, end: NaiveDate, tz: &Tz) -> Vec<DayStats> {
    let by_day = tallies(events, tz);
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let tally = by_day.get(&date).copied().unwrap_or_default();
            DayStats {
                date,
                label: weekday_label(date.weekday()),
                added: tally.added,
                completed: tally.completed,
            }
        })
        .collect()
}

fn active_days(events: &[ActivityEvent], tz: &Tz) -> BTreeSet<NaiveDate> {
    tallies(events, tz)
        .into_iter()
        .filter(|(_, tally)| tally.completed > 0)
        .map(|(date, _)| date)
        .collect()
}

/// Consecutive days with at least one completion, ending today, or
/// yesterday when nothing is done yet today.
pub fn current_streak(events: &[ActivityEvent], today: NaiveDate, tz: &Tz) -> u32 {
    let active = active_days(events, tz);
    let mut cursor = if active.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };
    let mut streak = 0;
    while active.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

pub fn longest_streak(events: &[ActivityEvent], tz: &Tz) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in active_days(events, tz) {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

pub fn mood_emoji(percent: f64) -> &'static str {
    if percent >= 90.0 {
        "🤩"
    } else if percent >= 75.0 {
        "😊"
    } else if percent >= 50.0 {
        "😐"
    } else if percent >= 25.0 {
        "😕"
    } else {
        "😔"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub title: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

pub fn achievements(events: &[ActivityEvent], today: NaiveDate, tz: &Tz) -> Vec<Achievement> {
    let first_day = events.iter().map(|event| to_local_date(event.at, tz)).min();
    let first_week = first_day.is_some_and(|first| today - first >= Duration::days(6));
    let longest = longest_streak(events, tz);
    let early_completions = events
        .iter()
        .filter(|event| {
            event.kind == ActivityKind::TaskCompleted
                && event.at.with_timezone(tz).hour() < EARLY_BIRD_HOUR
        })
        .count();
    let perfect_day = tallies(events, tz)
        .values()
        .any(|tally| tally.added > 0 && tally.completed >= tally.added);
    let focus_sessions = focus_sessions(events);

    let entry = |title, emoji, description, unlocked| Achievement {
        title,
        emoji,
        description,
        unlocked,
    };
    vec![
        entry("First Week", "🎯", "Completed your first week!", first_week),
        entry("Streak Master", "🔥", "7 day streak achieved", longest >= 7),
        entry("Early Bird", "🐦", "Complete 5 morning tasks", early_completions >= 5),
        entry("Perfectionist", "✨", "Perfect day completion", perfect_day),
        entry("Consistent", "📈", "30 day streak", longest >= 30),
        entry("Focused", "🧘", "Complete 50 focus sessions", focus_sessions >= 50),
    ]
}

pub fn focus_sessions(events: &[ActivityEvent]) -> usize {
    events
        .iter()
        .filter(|event| event.kind == ActivityKind::FocusSessionCompleted)
        .count()
}

/// Everything the progress page shows.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub days: Vec<DayStats>,
    pub today_completed: usize,
    pub today_total: usize,
    pub today_percent: f64,
    pub mood: &'static str,
    pub current_streak: u32,
    pub total_completed: u32,
    pub success_rate: u32,
    pub days_active: usize,
    pub focus_sessions: usize,
    pub achievements: Vec<Achievement>,
}

impl ProgressReport {
    /// The `range_days` days ending today, plus today's live list.
    #[instrument(skip(events, today_list, now, tz))]
    pub fn build(
        events: &[ActivityEvent],
        today_list: Summary,
        now: DateTime<Utc>,
        tz: &Tz,
        range_days: i64,
    ) -> Self {
        let today = to_local_date(now, tz);
        let start = today - Duration::days(range_days.max(1) - 1);
        let days = daily_stats(events, start, today, tz);

        let range_added: u32 = days.iter().map(|day| day.added).sum();
        let range_completed: u32 = days.iter().map(|day| day.completed).sum();
        let success_rate = if range_added == 0 {
            0
        } else {
            ((f64::from(range_completed) / f64::from(range_added)) * 100.0)
                .round()
                .min(100.0) as u32
        };

        Self {
            today_completed: today_list.completed,
            today_total: today_list.total,
            today_percent: today_list.percent,
            mood: mood_emoji(today_list.percent),
            current_streak: current_streak(events, today, tz),
            total_completed: tallies(events, tz).values().map(|tally| tally.completed).sum(),
            success_rate,
            days_active: days.iter().filter(|day| day.completed > 0).count(),
            focus_sessions: focus_sessions(events),
            achievements: achievements(events, today, tz),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    use super::{
        ActivityEvent, ActivityKind, ActivityLog, ProgressReport, achievements, current_streak,
        daily_stats, longest_streak, mood_emoji,
    };
    use crate::task_list::TaskList;

    const TZ: chrono_tz::Tz = chrono_tz::UTC;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, hour, 0, 0)
            .single()
            .expect("valid instant")
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).expect("valid date")
    }

    fn event(kind: ActivityKind, day: u32, hour: u32) -> ActivityEvent {
        ActivityEvent {
            at: at(day, hour),
            kind,
            task_id: Some(format!("t{day}{hour}")),
            category: Some("Personal".to_string()),
        }
    }

    fn completions(days: &[u32]) -> Vec<ActivityEvent> {
        days.iter()
            .map(|day| event(ActivityKind::TaskCompleted, *day, 15))
            .collect()
    }

    #[test]
    fn streak_ends_today_or_yesterday() {
        let events = completions(&[3, 4, 5, 7, 8, 9]);
        assert_eq!(current_streak(&events, date(9), &TZ), 3);
        assert_eq!(current_streak(&events, date(10), &TZ), 3);
        assert_eq!(current_streak(&events, date(11), &TZ), 0);
        assert_eq!(longest_streak(&events, &TZ), 3);
    }

    #[test]
    fn reopening_takes_back_a_completion() {
        let mut events = completions(&[9]);
        events.push(event(ActivityKind::TaskReopened, 9, 16));
        assert_eq!(current_streak(&events, date(9), &TZ), 0);
    }

    #[test]
    fn daily_stats_cover_every_day_in_range() {
        let mut events = completions(&[2, 4]);
        events.push(event(ActivityKind::TaskAdded, 4, 9));
        events.push(event(ActivityKind::TaskAdded, 4, 10));
        let days = daily_stats(&events, date(2), date(4), &TZ);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].label, "Sat");
        assert_eq!((days[1].added, days[1].completed), (0, 0));
        assert_eq!((days[2].added, days[2].completed), (2, 1));
    }

    #[test]
    fn achievements_unlock_from_history() {
        let mut events = completions(&(1..=7).collect::<Vec<_>>());
        for day in 1..=5 {
            events.push(event(ActivityKind::TaskCompleted, day, 8));
        }
        events.push(event(ActivityKind::TaskAdded, 7, 7));
        events.extend((0..50).map(|_| ActivityEvent::focus_session(at(6, 10))));

        let unlocked: Vec<&str> = achievements(&events, date(7), &TZ)
            .into_iter()
            .filter(|a| a.unlocked)
            .map(|a| a.title)
            .collect();
        assert_eq!(
            unlocked,
            vec!["First Week", "Streak Master", "Early Bird", "Perfectionist", "Focused"]
        );
    }

    #[test]
    fn report_combines_log_and_live_list() {
        let mut events = completions(&[5, 6, 7]);
        events.push(event(ActivityKind::TaskAdded, 7, 9));
        events.push(event(ActivityKind::TaskAdded, 7, 10));
        events.push(ActivityEvent::focus_session(at(7, 11)));

        let list = TaskList::seeded();
        let report = ProgressReport::build(&events, list.summary(), at(7, 20), &TZ, 7);
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.days[6].date, date(7));
        assert_eq!(report.current_streak, 3);
        assert_eq!(report.total_completed, 3);
        assert_eq!(report.days_active, 3);
        assert_eq!(report.success_rate, 100);
        assert_eq!(report.focus_sessions, 1);
        assert_eq!((report.today_completed, report.today_total), (1, 4));
        assert_eq!(report.mood, "😕");
    }

    #[test]
    fn mood_thresholds() {
        assert_eq!(mood_emoji(95.0), "🤩");
        assert_eq!(mood_emoji(75.0), "😊");
        assert_eq!(mood_emoji(50.0), "😐");
        assert_eq!(mood_emoji(10.0), "😔");
    }

    #[test]
    fn log_persists_as_json_lines() {
        let temp = tempdir().expect("tempdir");
        {
            let mut log = ActivityLog::open(temp.path()).expect("open");
            log.record(event(ActivityKind::TaskAdded, 1, 9)).expect("record");
            log.record(ActivityEvent::focus_session(at(1, 10))).expect("record");
        }
        let log = ActivityLog::open(temp.path()).expect("reopen");
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.events()[1].kind, ActivityKind::FocusSessionCompleted);
    }
}
