//! Reminder scheduling on top of a host notification capability.
//!
//! Every call first runs a one-shot initialization that checks platform
//! support and asks for permission. Unsupported or denied hosts turn every
//! call into a structured [`NotifyError`]; host failures are logged and
//! reported as [`NotifyError::SchedulingFailed`], never propagated.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::datetime::tomorrow_at;
use crate::routes::Route;
use crate::storage::{LocalStorage, NOTIFICATION_IDS_KEY, write_atomic};

pub const GROUP: &str = "dailyflow";
pub const DEFAULT_BREAK_INTERVAL_MINUTES: i64 = 30;
const MOTIVATION_HOUR: u32 = 9;

pub const MOTIVATIONAL_MESSAGES: &[&str] = &[
    "You're doing amazing! Every small step counts 🌟",
    "Your ADHD brain is unique and powerful 💪",
    "Progress, not perfection. You've got this! ✨",
    "Take a moment to celebrate what you've accomplished today 🎉",
    "Remember: different brains, amazing results! 🧠",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Every {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub repeats: bool,
    #[serde(default)]
    pub every: Option<Every>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    TaskReminder,
    BreakReminder,
    Motivation,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::TaskReminder => "task_reminder",
            Purpose::BreakReminder => "break_reminder",
            Purpose::Motivation => "motivation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecord {
    pub id: u32,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub extra: Value,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl NotificationRecord {
    pub fn purpose(&self) -> Option<Purpose> {
        serde_json::from_value(self.extra.get("type")?.clone()).ok()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.extra.get("taskId")?.as_str()
    }
}

/// Where tapping a delivered notification should take the user.
pub fn route_for_action(record: &NotificationRecord, action_id: &str) -> Option<Route> {
    if action_id != "tap" {
        return None;
    }
    Some(match record.task_id() {
        Some(task_id) => Route::Tasks {
            highlight: Some(task_id.to_string()),
        },
        None => Route::Home,
    })
}

/// Semantic identity of a reminder. The same key always maps to the same
/// notification id, so scheduling it again replaces the earlier entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderKey {
    pub purpose: Purpose,
    pub target: Option<String>,
}

impl ReminderKey {
    pub fn task(task_id: &str) -> Self {
        Self {
            purpose: Purpose::TaskReminder,
            target: Some(task_id.to_string()),
        }
    }

    pub fn singleton(purpose: Purpose) -> Self {
        Self {
            purpose,
            target: None,
        }
    }

    fn storage_key(&self) -> String {
        match &self.target {
            Some(target) => format!("{}:{target}", self.purpose.as_str()),
            None => self.purpose.as_str().to_string(),
        }
    }
}

/// Id allocation keyed by [`ReminderKey`], persisted so ids stay stable
/// across sessions. Keys are released when their reminder is cancelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRegistry {
    next: u32,
    ids: BTreeMap<String, u32>,
}

impl IdRegistry {
    pub fn load(storage: &LocalStorage) -> Self {
        storage.get_or(NOTIFICATION_IDS_KEY, Self::default())
    }

    pub fn id_for(&mut self, key: &ReminderKey) -> u32 {
        let storage_key = key.storage_key();
        if let Some(id) = self.ids.get(&storage_key) {
            return *id;
        }
        let in_use: BTreeSet<u32> = self.ids.values().copied().collect();
        let mut id = self.next;
        loop {
            id = match id.checked_add(1) {
                Some(next) if next <= i32::MAX as u32 => next,
                _ => {
                    warn!("notification id space exhausted; restarting at 1");
                    1
                }
            };
            if !in_use.contains(&id) {
                break;
            }
        }
        self.next = id;
        self.ids.insert(storage_key, id);
        id
    }

    pub fn release(&mut self, key: &ReminderKey) -> Option<u32> {
        self.ids.remove(&key.storage_key())
    }

    pub fn release_ids(&mut self, ids: &[u32]) {
        self.ids.retain(|_, id| !ids.contains(id));
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn save(&self, storage: &mut LocalStorage) -> anyhow::Result<()> {
        storage.set(NOTIFICATION_IDS_KEY, self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// The platform's local-notification capability.
pub trait NotificationHost {
    fn is_supported(&self) -> bool;
    fn request_permission(&mut self) -> anyhow::Result<Permission>;
    fn schedule(&mut self, records: &[NotificationRecord]) -> anyhow::Result<()>;
    fn cancel(&mut self, ids: &[u32]) -> anyhow::Result<()>;
    fn pending(&self) -> anyhow::Result<Vec<NotificationRecord>>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notifications are not supported on this host")]
    Unsupported,
    #[error("notification permission was denied")]
    Denied,
    #[error("scheduling failed: {0}")]
    SchedulingFailed(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Uninitialized,
    Ready,
    Unsupported,
    Denied,
}

pub struct NotificationService {
    host: Box<dyn NotificationHost>,
    init: InitState,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("init", &self.init)
            .finish_non_exhaustive()
    }
}

impl NotificationService {
    pub fn new(host: Box<dyn NotificationHost>) -> Self {
        Self {
            host,
            init: InitState::Uninitialized,
        }
    }

    /// Runs at most once; later calls return the cached outcome.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> NotifyResult<()> {
        if self.init == InitState::Uninitialized {
            self.init = if !self.host.is_supported() {
                info!("notifications not supported on this host");
                InitState::Unsupported
            } else {
                match self.host.request_permission() {
                    Ok(Permission::Granted) => {
                        info!("notification permission granted");
                        InitState::Ready
                    }
                    Ok(Permission::Denied) => {
                        info!("notification permission denied");
                        InitState::Denied
                    }
                    Err(err) => {
                        error!(error = %err, "permission request failed");
                        InitState::Denied
                    }
                }
            };
        }

        match self.init {
            InitState::Ready => Ok(()),
            InitState::Unsupported => Err(NotifyError::Unsupported),
            InitState::Denied | InitState::Uninitialized => Err(NotifyError::Denied),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.host.is_supported()
    }

    pub fn permission_granted(&self) -> bool {
        self.init == InitState::Ready
    }

    #[instrument(skip(self, record), fields(id = record.id))]
    pub fn schedule(&mut self, mut record: NotificationRecord) -> NotifyResult<u32> {
        if let Err(err) = self.initialize() {
            warn!(error = %err, "cannot schedule notification");
            return Err(err);
        }

        record.sound.get_or_insert_with(|| "default".to_string());
        record.group.get_or_insert_with(|| GROUP.to_string());
        let id = record.id;
        match self.host.schedule(std::slice::from_ref(&record)) {
            Ok(()) => {
                debug!(title = %record.title, "notification scheduled");
                Ok(id)
            }
            Err(err) => {
                error!(error = %err, "failed to schedule notification");
                Err(NotifyError::SchedulingFailed(err.to_string()))
            }
        }
    }

    fn schedule_keyed(
        &mut self,
        storage: &mut LocalStorage,
        key: &ReminderKey,
        build: impl FnOnce(u32) -> NotificationRecord,
    ) -> NotifyResult<u32> {
        self.initialize()?;
        let mut registry = IdRegistry::load(storage);
        let id = registry.id_for(key);
        if let Err(err) = registry.save(storage) {
            error!(error = %err, "failed to persist notification ids");
            return Err(NotifyError::SchedulingFailed(err.to_string()));
        }
        self.schedule(build(id))
    }

    #[instrument(skip(self, storage, title))]
    pub fn schedule_task_reminder(
        &mut self,
        storage: &mut LocalStorage,
        task_id: &str,
        title: &str,
        at: DateTime<Utc>,
    ) -> NotifyResult<u32> {
        self.schedule_keyed(storage, &ReminderKey::task(task_id), |id| NotificationRecord {
            id,
            title: "🎯 Gentle Reminder".to_string(),
            body: format!("Time to work on: {title}"),
            schedule: Some(Schedule {
                at,
                repeats: false,
                every: None,
            }),
            extra: json!({ "taskId": task_id, "type": Purpose::TaskReminder }),
            sound: None,
            group: None,
        })
    }

    /// First reminder `interval_minutes` from now, then hourly.
    #[instrument(skip(self, storage, now))]
    pub fn schedule_break_reminder(
        &mut self,
        storage: &mut LocalStorage,
        now: DateTime<Utc>,
        interval_minutes: i64,
    ) -> NotifyResult<u32> {
        let at = now + Duration::minutes(interval_minutes.max(1));
        self.schedule_keyed(storage, &ReminderKey::singleton(Purpose::BreakReminder), |id| {
            NotificationRecord {
                id,
                title: "☕ Break Time!".to_string(),
                body: "Your ADHD brain needs a rest. Take a 5-10 minute break!".to_string(),
                schedule: Some(Schedule {
                    at,
                    repeats: true,
                    every: Some(Every::Hour),
                }),
                extra: json!({ "type": Purpose::BreakReminder }),
                sound: None,
                group: None,
            }
        })
    }

    /// A random encouraging message at 09:00 tomorrow, then daily.
    #[instrument(skip(self, storage, now, tz, rng))]
    pub fn schedule_motivation<R: Rng + ?Sized>(
        &mut self,
        storage: &mut LocalStorage,
        now: DateTime<Utc>,
        tz: &Tz,
        rng: &mut R,
    ) -> NotifyResult<u32> {
        let at = tomorrow_at(now, tz, MOTIVATION_HOUR)
            .map_err(|err| NotifyError::SchedulingFailed(err.to_string()))?;
        let message = MOTIVATIONAL_MESSAGES
            .choose(rng)
            .copied()
            .unwrap_or(MOTIVATIONAL_MESSAGES[0]);
        self.schedule_keyed(storage, &ReminderKey::singleton(Purpose::Motivation), |id| {
            NotificationRecord {
                id,
                title: "💫 Daily Motivation".to_string(),
                body: message.to_string(),
                schedule: Some(Schedule {
                    at,
                    repeats: true,
                    every: Some(Every::Day),
                }),
                extra: json!({ "type": Purpose::Motivation }),
                sound: None,
                group: None,
            }
        })
    }

    #[instrument(skip(self, storage))]
    pub fn cancel(&mut self, storage: &mut LocalStorage, id: u32) -> NotifyResult<()> {
        self.initialize()?;
        self.host.cancel(&[id]).map_err(|err| {
            error!(error = %err, "failed to cancel notification");
            NotifyError::SchedulingFailed(err.to_string())
        })?;
        edit_registry(storage, |registry| registry.release_ids(&[id]));
        debug!("notification cancelled");
        Ok(())
    }

    /// Cancels the pending reminder of `task_id`, if any, and forgets its id.
    #[instrument(skip(self, storage))]
    pub fn cancel_task_reminder(
        &mut self,
        storage: &mut LocalStorage,
        task_id: &str,
    ) -> NotifyResult<usize> {
        let ids: Vec<u32> = self
            .pending_checked()?
            .into_iter()
            .filter(|record| record.task_id() == Some(task_id))
            .map(|record| record.id)
            .collect();
        self.cancel_ids(&ids)?;
        edit_registry(storage, |registry| {
            registry.release(&ReminderKey::task(task_id));
        });
        Ok(ids.len())
    }

    /// Cancels every pending entry tagged with `purpose`; returns how many.
    #[instrument(skip(self, storage))]
    pub fn cancel_purpose(
        &mut self,
        storage: &mut LocalStorage,
        purpose: Purpose,
    ) -> NotifyResult<usize> {
        let ids: Vec<u32> = self
            .pending_checked()?
            .into_iter()
            .filter(|record| record.purpose() == Some(purpose))
            .map(|record| record.id)
            .collect();
        self.cancel_ids(&ids)?;
        edit_registry(storage, |registry| registry.release_ids(&ids));
        Ok(ids.len())
    }

    #[instrument(skip(self, storage))]
    pub fn cancel_all(&mut self, storage: &mut LocalStorage) -> NotifyResult<usize> {
        let ids: Vec<u32> = self.pending_checked()?.iter().map(|record| record.id).collect();
        self.cancel_ids(&ids)?;
        edit_registry(storage, |registry| registry.release_ids(&ids));
        info!(count = ids.len(), "all notifications cancelled");
        Ok(ids.len())
    }

    /// Pending entries, or an empty list when the host is unavailable.
    pub fn pending(&mut self) -> Vec<NotificationRecord> {
        self.pending_checked().unwrap_or_default()
    }

    fn pending_checked(&mut self) -> NotifyResult<Vec<NotificationRecord>> {
        self.initialize()?;
        self.host.pending().map_err(|err| {
            error!(error = %err, "failed to list pending notifications");
            NotifyError::SchedulingFailed(err.to_string())
        })
    }

    fn cancel_ids(&mut self, ids: &[u32]) -> NotifyResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.host.cancel(ids).map_err(|err| {
            error!(error = %err, "failed to cancel notifications");
            NotifyError::SchedulingFailed(err.to_string())
        })
    }
}

fn edit_registry(storage: &mut LocalStorage, edit: impl FnOnce(&mut IdRegistry)) {
    let mut registry = IdRegistry::load(storage);
    edit(&mut registry);
    if let Err(err) = registry.save(storage) {
        warn!(error = %err, "failed to persist released notification ids");
    }
}

/// Host for platforms without local notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedHost;

impl NotificationHost for UnsupportedHost {
    fn is_supported(&self) -> bool {
        false
    }

    fn request_permission(&mut self) -> anyhow::Result<Permission> {
        Ok(Permission::Denied)
    }

    fn schedule(&mut self, _records: &[NotificationRecord]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("notifications unsupported"))
    }

    fn cancel(&mut self, _ids: &[u32]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("notifications unsupported"))
    }

    fn pending(&self) -> anyhow::Result<Vec<NotificationRecord>> {
        Ok(Vec::new())
    }
}

/// Keeps the pending queue in `notifications.json` inside the data
/// directory. Scheduling an existing id replaces that entry.
#[derive(Debug)]
pub struct FileNotificationHost {
    pub path: PathBuf,
    permission: Permission,
}

impl FileNotificationHost {
    pub fn open(data_dir: &Path, permission: Permission) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        Ok(Self {
            path: data_dir.join("notifications.json"),
            permission,
        })
    }

    fn load(&self) -> anyhow::Result<Vec<NotificationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", self.path.display()))
    }

    fn save(&self, records: &[NotificationRecord]) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(records)?;
        write_atomic(&self.path, serialized.as_bytes())
    }
}

impl NotificationHost for FileNotificationHost {
    fn is_supported(&self) -> bool {
        true
    }

    fn request_permission(&mut self) -> anyhow::Result<Permission> {
        Ok(self.permission)
    }

    fn schedule(&mut self, records: &[NotificationRecord]) -> anyhow::Result<()> {
        let mut pending = self.load()?;
        for record in records {
            pending.retain(|existing| existing.id != record.id);
            pending.push(record.clone());
        }
        pending.sort_by_key(|record| record.id);
        self.save(&pending)
    }

    fn cancel(&mut self, ids: &[u32]) -> anyhow::Result<()> {
        let mut pending = self.load()?;
        pending.retain(|record| !ids.contains(&record.id));
        self.save(&pending)
    }

    fn pending(&self) -> anyhow::Result<Vec<NotificationRecord>> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::tempdir;

    use super::{
        Every, FileNotificationHost, IdRegistry, NotificationHost, NotificationRecord,
        NotificationService, NotifyError, Permission, Purpose, ReminderKey, UnsupportedHost,
        route_for_action,
    };
    use crate::routes::Route;
    use crate::storage::LocalStorage;

    struct FailingHost;

    impl NotificationHost for FailingHost {
        fn is_supported(&self) -> bool {
            true
        }
        fn request_permission(&mut self) -> anyhow::Result<Permission> {
            Ok(Permission::Granted)
        }
        fn schedule(&mut self, _records: &[NotificationRecord]) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("plugin crashed"))
        }
        fn cancel(&mut self, _ids: &[u32]) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("plugin crashed"))
        }
        fn pending(&self) -> anyhow::Result<Vec<NotificationRecord>> {
            Ok(Vec::new())
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0)
            .single()
            .expect("valid now")
    }

    fn file_service(dir: &std::path::Path, permission: Permission) -> NotificationService {
        NotificationService::new(Box::new(
            FileNotificationHost::open(dir, permission).expect("open host"),
        ))
    }

    #[test]
    fn unsupported_host_degrades_without_panicking() {
        let mut storage = LocalStorage::in_memory();
        let mut service = NotificationService::new(Box::new(UnsupportedHost));
        assert_eq!(
            service.schedule_task_reminder(&mut storage, "t1", "Buy milk", now()),
            Err(NotifyError::Unsupported)
        );
        assert_eq!(service.cancel(&mut storage, 4), Err(NotifyError::Unsupported));
        assert_eq!(service.cancel_all(&mut storage), Err(NotifyError::Unsupported));
        assert!(service.pending().is_empty());
        assert!(!service.permission_granted());
    }

    #[test]
    fn denied_permission_is_reported() {
        let temp = tempdir().expect("tempdir");
        let mut storage = LocalStorage::in_memory();
        let mut service = file_service(temp.path(), Permission::Denied);
        assert_eq!(
            service.schedule_break_reminder(&mut storage, now(), 30),
            Err(NotifyError::Denied)
        );
    }

    #[test]
    fn host_failure_becomes_scheduling_failed() {
        let mut storage = LocalStorage::in_memory();
        let mut service = NotificationService::new(Box::new(FailingHost));
        let result = service.schedule_task_reminder(&mut storage, "t1", "Buy milk", now());
        assert!(matches!(result, Err(NotifyError::SchedulingFailed(_))));
    }

    #[test]
    fn rescheduling_same_task_overwrites() {
        let temp = tempdir().expect("tempdir");
        let mut storage = LocalStorage::in_memory();
        let mut service = file_service(temp.path(), Permission::Granted);

        let first = service
            .schedule_task_reminder(&mut storage, "t1", "Buy milk", now())
            .expect("schedule");
        let other = service
            .schedule_task_reminder(&mut storage, "t2", "Call mom", now())
            .expect("schedule");
        let again = service
            .schedule_task_reminder(&mut storage, "t1", "Buy oat milk", now())
            .expect("reschedule");

        assert_eq!(first, again);
        assert_ne!(first, other);
        let pending = service.pending();
        assert_eq!(pending.len(), 2);
        let record = pending.iter().find(|r| r.id == first).expect("t1 reminder");
        assert_eq!(record.body, "Time to work on: Buy oat milk");
        assert_eq!(record.purpose(), Some(Purpose::TaskReminder));
        assert_eq!(record.task_id(), Some("t1"));
        assert_eq!(record.group.as_deref(), Some("dailyflow"));
    }

    #[test]
    fn cancel_by_purpose_leaves_other_entries() {
        let temp = tempdir().expect("tempdir");
        let mut storage = LocalStorage::in_memory();
        let mut service = file_service(temp.path(), Permission::Granted);
        let mut rng = StdRng::seed_from_u64(7);

        service
            .schedule_break_reminder(&mut storage, now(), 45)
            .expect("break");
        service
            .schedule_motivation(&mut storage, now(), &chrono_tz::UTC, &mut rng)
            .expect("motivation");
        service
            .schedule_task_reminder(&mut storage, "t9", "Stretch", now())
            .expect("task");

        assert_eq!(service.cancel_purpose(&mut storage, Purpose::BreakReminder), Ok(1));
        let remaining: Vec<_> = service.pending().iter().filter_map(|r| r.purpose()).collect();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&Purpose::BreakReminder));

        assert_eq!(service.cancel_all(&mut storage), Ok(2));
        assert!(service.pending().is_empty());
        assert!(IdRegistry::load(&storage).is_empty());
    }

    #[test]
    fn break_and_motivation_schedules() {
        let temp = tempdir().expect("tempdir");
        let mut storage = LocalStorage::in_memory();
        let mut service = file_service(temp.path(), Permission::Granted);
        let mut rng = StdRng::seed_from_u64(1);

        service
            .schedule_break_reminder(&mut storage, now(), 30)
            .expect("break");
        service
            .schedule_motivation(&mut storage, now(), &chrono_tz::UTC, &mut rng)
            .expect("motivation");

        let pending = service.pending();
        let brk = pending
            .iter()
            .find(|r| r.purpose() == Some(Purpose::BreakReminder))
            .and_then(|r| r.schedule.clone())
            .expect("break schedule");
        assert_eq!((brk.at - now()).num_minutes(), 30);
        assert_eq!(brk.every, Some(Every::Hour));

        let motivation = pending
            .iter()
            .find(|r| r.purpose() == Some(Purpose::Motivation))
            .expect("motivation");
        let schedule = motivation.schedule.clone().expect("schedule");
        assert_eq!(schedule.at.format("%Y-%m-%d %H:%M").to_string(), "2026-06-02 09:00");
        assert_eq!(schedule.every, Some(Every::Day));
        assert!(super::MOTIVATIONAL_MESSAGES.contains(&motivation.body.as_str()));
    }

    #[test]
    fn registry_ids_are_stable_and_distinct() {
        let mut storage = LocalStorage::in_memory();
        let mut registry = IdRegistry::load(&storage);
        let a = registry.id_for(&ReminderKey::task("a"));
        let b = registry.id_for(&ReminderKey::task("b"));
        registry.save(&mut storage).expect("save");

        let mut reloaded = IdRegistry::load(&storage);
        assert_eq!(reloaded.id_for(&ReminderKey::task("a")), a);
        assert_eq!(reloaded.id_for(&ReminderKey::task("b")), b);
        assert_ne!(a, b);
        assert!(a >= 1);
    }

    #[test]
    fn wrapped_ids_skip_those_still_in_use() {
        let mut registry = IdRegistry {
            next: i32::MAX as u32,
            ids: [("task_reminder:a".to_string(), 1), ("task_reminder:b".to_string(), 2)]
                .into_iter()
                .collect(),
        };
        let fresh = registry.id_for(&ReminderKey::task("c"));
        assert_eq!(fresh, 3);
        assert_eq!(registry.id_for(&ReminderKey::task("a")), 1);
    }

    #[test]
    fn cancelling_a_task_reminder_forgets_its_key() {
        let temp = tempdir().expect("tempdir");
        let mut storage = LocalStorage::in_memory();
        let mut service = file_service(temp.path(), Permission::Granted);

        service
            .schedule_task_reminder(&mut storage, "t1", "Buy milk", now())
            .expect("schedule");
        service
            .schedule_task_reminder(&mut storage, "t2", "Call mom", now())
            .expect("schedule");
        assert_eq!(IdRegistry::load(&storage).len(), 2);

        assert_eq!(service.cancel_task_reminder(&mut storage, "t1"), Ok(1));
        assert_eq!(IdRegistry::load(&storage).len(), 1);
        assert_eq!(service.pending().len(), 1);

        let second = service.pending()[0].id;
        service.cancel(&mut storage, second).expect("cancel");
        assert!(IdRegistry::load(&storage).is_empty());
    }

    #[test]
    fn tap_routes_to_task_or_home() {
        let record = NotificationRecord {
            id: 1,
            title: String::new(),
            body: String::new(),
            schedule: None,
            extra: serde_json::json!({ "taskId": "t1", "type": "task_reminder" }),
            sound: None,
            group: None,
        };
        assert_eq!(
            route_for_action(&record, "tap"),
            Some(Route::Tasks {
                highlight: Some("t1".to_string())
            })
        );
        let plain = NotificationRecord {
            extra: serde_json::json!({ "type": "motivation" }),
            ..record.clone()
        };
        assert_eq!(route_for_action(&plain, "tap"), Some(Route::Home));
        assert_eq!(route_for_action(&record, "dismiss"), None);
    }
}
