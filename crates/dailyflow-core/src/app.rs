//! The application context: every store and service the pages use, owned
//! in one place and handed to the front-end explicitly.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument, warn};

use crate::calendar::{CalendarProvider, GoogleCalendarClient};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, HapticsKind, NotificationHostKind};
use crate::datetime::{DEFAULT_REMINDER_LEAD_MINUTES, reminder_time, resolve_timezone};
use crate::focus::{FocusPreset, FocusTimer, TickOutcome, preset_for_focus_length};
use crate::haptics::{BellHaptics, HapticHost, Haptics, NoHaptics};
use crate::notify::{
    FileNotificationHost, NotificationHost, NotificationService, NotifyError, NotifyResult,
    Permission, Purpose, UnsupportedHost,
};
use crate::onboarding::{self, Advance, Onboarding};
use crate::plans;
use crate::progress::{ActivityEvent, ActivityKind, ActivityLog, DEFAULT_RANGE_DAYS, ProgressReport};
use crate::routes::Route;
use crate::settings::{Settings, Toggle};
use crate::storage::{LocalStorage, ONBOARDING_ANSWERS_KEY, WELCOME_SHOWN_KEY};
use crate::task::{NewTask, Task};
use crate::task_list::{AddRejected, TaskList, ToggleOutcome};
use crate::theme::ThemeProvider;
use crate::wheel::{DEFAULT_REVEAL_MS, DecisionWheel, SpinRejected};

/// What happened to the reminder requested by an add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    NoTime,
    Disabled,
    InvalidTime,
    Scheduled { id: u32, at: DateTime<Utc> },
    Failed(NotifyError),
}

#[derive(Debug, Clone)]
pub struct Added {
    pub task: Task,
    pub reminder: ReminderOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub outcome: ToggleOutcome,
    /// Show the celebration screen.
    pub celebrate: bool,
}

/// Services whose behavior depends on the host the app runs on.
pub struct Hosts {
    pub notifications: Box<dyn NotificationHost>,
    pub haptics: Box<dyn HapticHost>,
    pub calendar: Box<dyn CalendarProvider>,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub tz: Tz,
    pub reminder_lead_minutes: i64,
    pub wheel_reveal_ms: i64,
    pub seed_tasks: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tz: chrono_tz::UTC,
            reminder_lead_minutes: DEFAULT_REMINDER_LEAD_MINUTES,
            wheel_reveal_ms: DEFAULT_REVEAL_MS,
            seed_tasks: true,
        }
    }
}

pub struct AppContext {
    clock: Box<dyn Clock>,
    tz: Tz,
    reminder_lead_minutes: i64,
    rng: StdRng,
    route: Route,
    pub storage: LocalStorage,
    pub theme: ThemeProvider,
    pub settings: Settings,
    pub notifications: NotificationService,
    pub haptics: Haptics,
    pub calendar: Box<dyn CalendarProvider>,
    pub tasks: TaskList,
    pub wheel: DecisionWheel,
    pub focus: FocusTimer,
    pub activity: ActivityLog,
    pub onboarding: Onboarding,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("tz", &self.tz)
            .field("route", &self.route)
            .field("tasks", &self.tasks.tasks().len())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn assemble(
        clock: Box<dyn Clock>,
        storage: LocalStorage,
        activity: ActivityLog,
        hosts: Hosts,
        options: Options,
    ) -> Self {
        let settings = Settings::load(&storage);
        let theme = ThemeProvider::load(&storage);
        let haptics = Haptics::new(hosts.haptics, settings.vibration).with_sounds(settings.sounds);
        let route = Route::Home.gate(onboarding::is_complete(&storage));
        let focus = preferred_preset(&storage).map(FocusTimer::new).unwrap_or_default();
        Self {
            clock,
            tz: options.tz,
            reminder_lead_minutes: options.reminder_lead_minutes,
            rng: StdRng::from_os_rng(),
            route,
            storage,
            theme,
            settings,
            notifications: NotificationService::new(hosts.notifications),
            haptics,
            calendar: hosts.calendar,
            tasks: if options.seed_tasks {
                TaskList::seeded()
            } else {
                TaskList::empty()
            },
            wheel: DecisionWheel::new(options.wheel_reveal_ms),
            focus,
            activity,
            onboarding: Onboarding::new(),
        }
    }

    /// File-backed context for the terminal app.
    #[instrument(skip(cfg, data_dir))]
    pub fn open(cfg: &Config, data_dir: &Path) -> anyhow::Result<Self> {
        let tz = resolve_timezone(cfg.timezone().as_deref());
        let storage = LocalStorage::open(data_dir)
            .with_context(|| format!("failed to open storage in {}", data_dir.display()))?;
        let activity = ActivityLog::open(data_dir)?;

        let notifications: Box<dyn NotificationHost> = match cfg.notification_host() {
            NotificationHostKind::File => {
                let permission = if cfg.notification_permission_granted() {
                    Permission::Granted
                } else {
                    Permission::Denied
                };
                Box::new(FileNotificationHost::open(data_dir, permission)?)
            }
            NotificationHostKind::None => Box::new(UnsupportedHost),
        };
        let haptics: Box<dyn HapticHost> = match cfg.haptics() {
            HapticsKind::Bell => Box::new(BellHaptics),
            HapticsKind::None => Box::new(NoHaptics),
        };
        let calendar = Box::new(GoogleCalendarClient::new(cfg.calendar_access_token(), tz));

        info!(tz = %tz, data_dir = %data_dir.display(), "application context ready");
        let mut ctx = Self::assemble(
            Box::new(SystemClock),
            storage,
            activity,
            Hosts {
                notifications,
                haptics,
                calendar,
            },
            Options {
                tz,
                reminder_lead_minutes: cfg.reminder_lead_minutes(),
                wheel_reveal_ms: cfg.wheel_reveal_ms(),
                seed_tasks: true,
            },
        );
        for problem in ctx.reconcile_reminders() {
            info!(error = %problem, "repeating reminder not scheduled");
        }
        Ok(ctx)
    }

    /// Replaces the random source, for reproducible spins and messages.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn sleep(&self, by: chrono::Duration) {
        self.clock.sleep(by);
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn onboarding_complete(&self) -> bool {
        onboarding::is_complete(&self.storage)
    }

    /// Navigates, honoring the onboarding gate. Returns where we landed.
    pub fn navigate(&mut self, path: &str) -> &Route {
        self.route = Route::parse(path).gate(self.onboarding_complete());
        &self.route
    }

    /// True exactly once: the first launch after onboarding.
    pub fn take_first_launch(&mut self) -> anyhow::Result<bool> {
        if !self.onboarding_complete() || self.storage.get_or(WELCOME_SHOWN_KEY, false) {
            return Ok(false);
        }
        self.storage.set(WELCOME_SHOWN_KEY, &true)?;
        Ok(true)
    }

    fn record(&mut self, event: ActivityEvent) {
        if let Err(err) = self.activity.record(event) {
            warn!(error = %err, "failed to record activity");
        }
    }

    #[instrument(skip(self, new), fields(title = %new.title))]
    pub fn add_task(&mut self, new: NewTask) -> Result<Added, AddRejected> {
        let task = self.tasks.add(new)?.clone();
        let now = self.now();
        self.record(ActivityEvent::for_task(ActivityKind::TaskAdded, &task, now));
        let reminder = self.schedule_reminder_for(&task, now);
        Ok(Added { task, reminder })
    }

    fn schedule_reminder_for(&mut self, task: &Task, now: DateTime<Utc>) -> ReminderOutcome {
        let Some(time) = task.time.as_deref() else {
            return ReminderOutcome::NoTime;
        };
        if !self.settings.task_reminders {
            return ReminderOutcome::Disabled;
        }
        let at = match reminder_time(time, now, &self.tz, self.reminder_lead_minutes) {
            Ok(at) => at,
            Err(err) => {
                warn!(time, error = %err, "task time not understood; no reminder");
                return ReminderOutcome::InvalidTime;
            }
        };
        match self
            .notifications
            .schedule_task_reminder(&mut self.storage, &task.id, &task.title, at)
        {
            Ok(id) => ReminderOutcome::Scheduled { id, at },
            Err(err) => ReminderOutcome::Failed(err),
        }
    }

    #[instrument(skip(self))]
    pub fn toggle_task(&mut self, id: &str) -> Toggled {
        let outcome = self.tasks.toggle(id);
        let now = self.now();
        let celebrate = match &outcome {
            ToggleOutcome::Completed(task) => {
                self.haptics.pulse();
                self.record(ActivityEvent::for_task(ActivityKind::TaskCompleted, task, now));
                self.settings.celebration_animations
            }
            ToggleOutcome::Reopened(task) => {
                self.record(ActivityEvent::for_task(ActivityKind::TaskReopened, task, now));
                false
            }
            ToggleOutcome::NotFound => false,
        };
        Toggled { outcome, celebrate }
    }

    /// Deletes after `confirm` agrees and drops the task's pending reminder.
    #[instrument(skip(self, confirm))]
    pub fn delete_task(&mut self, id: &str, confirm: impl FnOnce(&Task) -> bool) -> Option<Task> {
        let removed = self.tasks.delete(id, confirm)?;
        let now = self.now();
        self.record(ActivityEvent::for_task(ActivityKind::TaskDeleted, &removed, now));
        if removed.time.is_some()
            && let Err(err) = self
                .notifications
                .cancel_task_reminder(&mut self.storage, &removed.id)
        {
            warn!(error = %err, "could not cancel reminder of deleted task");
        }
        Some(removed)
    }

    pub fn apply_plan(&mut self, id_or_title: &str) -> anyhow::Result<Vec<Task>> {
        let plan = plans::find(id_or_title)
            .ok_or_else(|| anyhow::anyhow!("no pre-planned bundle named {id_or_title}"))?;
        let added = self.tasks.apply_bundle(plan);
        let now = self.now();
        for task in &added {
            self.record(ActivityEvent::for_task(ActivityKind::TaskAdded, task, now));
        }
        Ok(added)
    }

    pub fn spin_wheel(&mut self) -> Result<(), SpinRejected> {
        let now = self.now();
        self.wheel.spin(self.tasks.tasks(), now, &mut self.rng)
    }

    /// Reveals the wheel's pick once its delay has passed.
    pub fn poll_wheel(&mut self) -> Option<Task> {
        let revealed = self.wheel.poll(self.now())?;
        self.haptics.pulse();
        Some(revealed)
    }

    /// Ticks the focus timer `seconds` times, logging a finished session.
    pub fn focus_advance(&mut self, seconds: u32) -> TickOutcome {
        let outcome = self.focus.advance(seconds);
        if let TickOutcome::SessionFinished { .. } = outcome {
            let now = self.now();
            self.haptics.pulse();
            self.record(ActivityEvent::focus_session(now));
        }
        outcome
    }

    pub fn progress_report(&self) -> ProgressReport {
        ProgressReport::build(
            self.activity.events(),
            self.tasks.summary(),
            self.now(),
            &self.tz,
            DEFAULT_RANGE_DAYS,
        )
    }

    pub fn toggle_theme(&mut self) -> anyhow::Result<bool> {
        self.theme.toggle(&mut self.storage)
    }

    /// Persists a toggle and applies what it implies for reminders, sound
    /// and haptics. Reminder effects apply even when the value is unchanged.
    /// Notification trouble is reported, not propagated.
    #[instrument(skip(self))]
    pub fn set_setting(&mut self, toggle: Toggle, value: bool) -> anyhow::Result<Option<NotifyError>> {
        let changed = self.settings.set(toggle, value);
        if changed {
            self.settings.save(&mut self.storage)?;
        }

        let effect = match (toggle, value) {
            (Toggle::Sounds, enabled) => {
                self.haptics.set_sounds(enabled);
                if changed && enabled {
                    self.haptics.chime();
                }
                Ok(())
            }
            (Toggle::Vibration, enabled) => {
                self.haptics.set_enabled(enabled);
                if changed && enabled {
                    self.haptics.pulse();
                }
                Ok(())
            }
            (Toggle::BreakReminders, true) => self.add_break_reminder().map(|_| ()),
            (Toggle::BreakReminders, false) => self
                .notifications
                .cancel_purpose(&mut self.storage, Purpose::BreakReminder)
                .map(|_| ()),
            (Toggle::DailyMotivation, true) => self.add_motivation_reminder().map(|_| ()),
            (Toggle::DailyMotivation, false) => self
                .notifications
                .cancel_purpose(&mut self.storage, Purpose::Motivation)
                .map(|_| ()),
            _ => Ok(()),
        };
        Ok(effect.err())
    }

    /// Schedules (or replaces) the repeating break reminder at the current
    /// interval.
    pub fn add_break_reminder(&mut self) -> NotifyResult<u32> {
        let now = self.now();
        self.notifications
            .schedule_break_reminder(&mut self.storage, now, self.settings.break_interval_minutes)
    }

    /// Schedules (or replaces) the daily motivation message.
    pub fn add_motivation_reminder(&mut self) -> NotifyResult<u32> {
        let now = self.now();
        self.notifications
            .schedule_motivation(&mut self.storage, now, &self.tz, &mut self.rng)
    }

    /// Schedules the repeating reminders the settings ask for that have no
    /// pending entry. Returns what went wrong.
    #[instrument(skip(self))]
    pub fn reconcile_reminders(&mut self) -> Vec<NotifyError> {
        let pending: Vec<Purpose> = self
            .notifications
            .pending()
            .iter()
            .filter_map(|record| record.purpose())
            .collect();
        let mut problems = Vec::new();
        if self.settings.daily_motivation
            && !pending.contains(&Purpose::Motivation)
            && let Err(err) = self.add_motivation_reminder()
        {
            problems.push(err);
        }
        if self.settings.break_reminders
            && !pending.contains(&Purpose::BreakReminder)
            && let Err(err) = self.add_break_reminder()
        {
            problems.push(err);
        }
        problems
    }

    /// Changes the interval, rescheduling when break reminders are on.
    pub fn set_break_interval(&mut self, minutes: i64) -> anyhow::Result<Option<NotifyError>> {
        if !self.settings.set_break_interval(minutes)? {
            return Ok(None);
        }
        self.settings.save(&mut self.storage)?;
        if !self.settings.break_reminders {
            return Ok(None);
        }
        let now = self.now();
        Ok(self
            .notifications
            .schedule_break_reminder(&mut self.storage, now, minutes)
            .err())
    }

    /// Advances onboarding; finishing routes home.
    pub fn onboarding_next(&mut self) -> anyhow::Result<Advance> {
        let advance = self.onboarding.next(&mut self.storage)?;
        if advance == Advance::Finished {
            self.route = Route::Home;
            if let Some(preset) = preferred_preset(&self.storage) {
                self.focus.select_preset(preset);
            }
        }
        Ok(advance)
    }
}

fn preferred_preset(storage: &LocalStorage) -> Option<&'static FocusPreset> {
    let answers: BTreeMap<String, String> = storage.get(ONBOARDING_ANSWERS_KEY)?;
    preset_for_focus_length(answers.get("focus_length")?)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::{TimeZone, Utc};

    use super::{AppContext, Hosts, Options, ReminderOutcome};
    use crate::calendar::GoogleCalendarClient;
    use crate::clock::VirtualClock;
    use crate::haptics::NoHaptics;
    use crate::notify::{NotifyError, Purpose, UnsupportedHost};
    use crate::progress::{ActivityKind, ActivityLog};
    use crate::routes::Route;
    use crate::settings::Toggle;
    use crate::storage::LocalStorage;
    use crate::task::NewTask;

    fn context(clock: Rc<VirtualClock>) -> AppContext {
        AppContext::assemble(
            Box::new(clock),
            LocalStorage::in_memory(),
            ActivityLog::in_memory(),
            Hosts {
                notifications: Box::new(UnsupportedHost),
                haptics: Box::new(NoHaptics),
                calendar: Box::new(GoogleCalendarClient::new(None, chrono_tz::UTC)),
            },
            Options::default(),
        )
        .with_rng_seed(9)
    }

    fn clock() -> Rc<VirtualClock> {
        Rc::new(VirtualClock::new(
            Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0)
                .single()
                .expect("valid start"),
        ))
    }

    #[test]
    fn unsupported_notifications_do_not_block_adding() {
        let mut ctx = context(clock());
        let mut new = NewTask::new("Buy milk");
        new.time = Some("5:00 PM".to_string());
        let added = ctx.add_task(new).expect("added");
        assert_eq!(added.reminder, ReminderOutcome::Failed(NotifyError::Unsupported));
        assert_eq!(ctx.tasks.tasks().len(), 5);
        assert_eq!(ctx.activity.events()[0].kind, ActivityKind::TaskAdded);
    }

    #[test]
    fn unparseable_time_still_adds() {
        let mut ctx = context(clock());
        let mut new = NewTask::new("Nap");
        new.time = Some("after lunch".to_string());
        let added = ctx.add_task(new).expect("added");
        assert_eq!(added.reminder, ReminderOutcome::InvalidTime);
    }

    #[test]
    fn disabled_task_reminders_skip_scheduling() {
        let mut ctx = context(clock());
        ctx.set_setting(Toggle::TaskReminders, false).expect("setting");
        let mut new = NewTask::new("Call mom");
        new.time = Some("6:00 PM".to_string());
        assert_eq!(ctx.add_task(new).expect("added").reminder, ReminderOutcome::Disabled);
    }

    #[test]
    fn completing_celebrates_and_logs() {
        let mut ctx = context(clock());
        let toggled = ctx.toggle_task("2");
        assert!(toggled.celebrate);
        ctx.set_setting(Toggle::CelebrationAnimations, false).expect("setting");
        assert!(!ctx.toggle_task("3").celebrate);
        assert!(!ctx.toggle_task("3").celebrate);
        let kinds: Vec<ActivityKind> = ctx.activity.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::TaskCompleted, ActivityKind::TaskCompleted, ActivityKind::TaskReopened]
        );
    }

    #[test]
    fn wheel_reveals_after_delay_on_injected_clock() {
        let clock = clock();
        let mut ctx = context(Rc::clone(&clock));
        ctx.spin_wheel().expect("spin");
        assert!(ctx.poll_wheel().is_none());
        clock.advance_ms(3_000);
        let picked = ctx.poll_wheel().expect("revealed");
        assert!(!picked.completed);
    }

    #[test]
    fn break_toggle_reports_unsupported_host() {
        let mut ctx = context(clock());
        let problem = ctx.set_setting(Toggle::BreakReminders, true).expect("setting");
        assert_eq!(problem, Some(NotifyError::Unsupported));
        assert!(ctx.settings.break_reminders);
        assert!(
            ctx.notifications
                .cancel_purpose(&mut ctx.storage, Purpose::BreakReminder)
                .is_err()
        );
    }

    #[test]
    fn onboarding_gates_routes_until_finished() {
        let mut ctx = context(clock());
        assert_eq!(ctx.route(), &Route::Onboarding);
        assert_eq!(ctx.navigate("/progress"), &Route::Onboarding);

        ctx.onboarding_next().expect("welcome");
        for _ in 0..3 {
            ctx.onboarding.select(1).expect("select");
            ctx.onboarding_next().expect("next");
        }
        ctx.onboarding_next().expect("finish");
        assert_eq!(ctx.route(), &Route::Home);
        assert_eq!(ctx.focus.preset().id, "adhd-friendly");
        assert_eq!(ctx.navigate("/progress"), &Route::Progress);
        assert!(ctx.take_first_launch().expect("first"));
        assert!(!ctx.take_first_launch().expect("second"));
    }

    #[test]
    fn enabling_sounds_and_vibration_gives_feedback() {
        let mut ctx = context(clock());
        ctx.set_setting(Toggle::Sounds, true).expect("unchanged");
        assert_eq!(ctx.haptics.chimed(), 0);
        ctx.set_setting(Toggle::Sounds, false).expect("off");
        ctx.set_setting(Toggle::Sounds, true).expect("on");
        assert_eq!(ctx.haptics.chimed(), 1);

        ctx.set_setting(Toggle::Vibration, false).expect("off");
        ctx.set_setting(Toggle::Vibration, true).expect("on");
        assert_eq!(ctx.haptics.fired(), 1);
    }

    #[test]
    fn finished_focus_session_is_logged() {
        let mut ctx = context(clock());
        ctx.focus.start();
        ctx.focus_advance(25 * 60);
        assert_eq!(ctx.progress_report().focus_sessions, 1);
    }
}
