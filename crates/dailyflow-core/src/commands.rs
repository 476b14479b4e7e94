use std::io::{BufRead, Write};

use anyhow::{Context, anyhow, bail};
use chrono::Duration;
use tracing::{debug, info, instrument, warn};

use crate::app::{AppContext, ReminderOutcome};
use crate::calendar::{event_for_task, marked_connected};
use crate::cli::Invocation;
use crate::datetime::{format_clock, format_countdown};
use crate::focus::{TickOutcome, TimerState, find_preset};
use crate::loading::LoadingAnimation;
use crate::notify::route_for_action;
use crate::onboarding::Advance;
use crate::plans::PlanHorizon;
use crate::render::Renderer;
use crate::routes::Route;
use crate::settings::Toggle;
use crate::task::{NewTask, Priority};
use crate::task_list::{ToggleOutcome, delete_prompt};

const SPLASH_FRAME_MS: i64 = 30;
const WHEEL_POLL_MS: i64 = 100;

/// Commands that work before onboarding is finished.
const UNGATED: &[&str] = &[
    "onboarding",
    "pick",
    "next",
    "back",
    "splash",
    "help",
    "version",
    "quit",
    "exit",
    "shell",
];

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "shell",
        "home",
        "tasks",
        "add",
        "done",
        "toggle",
        "delete",
        "plans",
        "plan",
        "spin",
        "focus",
        "progress",
        "settings",
        "set",
        "interval",
        "theme",
        "reminders",
        "calendar",
        "go",
        "onboarding",
        "pick",
        "next",
        "back",
        "splash",
        "help",
        "version",
        "quit",
        "exit",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A terminal session: the application context, a renderer, and the
/// streams commands read confirmations from and write pages to.
pub struct Session<R, W> {
    ctx: AppContext,
    renderer: Renderer,
    input: R,
    out: W,
    splash: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(ctx: AppContext, renderer: Renderer, input: R, out: W) -> Self {
        Self {
            ctx,
            renderer,
            input,
            out,
            splash: true,
        }
    }

    pub fn with_splash(mut self, enabled: bool) -> Self {
        self.splash = enabled;
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Plays the welcome splash on the first launch after onboarding.
    pub fn launch(&mut self) -> anyhow::Result<()> {
        if self.splash && self.ctx.take_first_launch()? {
            info!("first launch after onboarding; playing splash");
            self.play_splash()?;
        }
        Ok(())
    }

    /// Read-eval loop until `quit` or end of input. Command errors are
    /// printed and the loop carries on.
    #[instrument(skip(self))]
    pub fn run_shell(&mut self) -> anyhow::Result<()> {
        self.render_route()?;
        let known = known_command_names();
        loop {
            write!(self.out, "\ndailyflow {}> ", self.ctx.route().path())?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            let tokens: Vec<String> = line.split_whitespace().map(ToString::to_string).collect();
            let Some((first, args)) = tokens.split_first() else {
                continue;
            };
            let Some(command) = expand_command_abbrev(first, &known) else {
                writeln!(self.out, "Unknown command: {first}. Type `help` for the list.")?;
                continue;
            };

            let inv = Invocation {
                command: command.to_string(),
                args: args.to_vec(),
            };
            match self.dispatch(&inv) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => {
                    warn!(command = %inv.command, error = %err, "command failed");
                    writeln!(self.out, "error: {err:#}")?;
                }
            }
        }
        info!("shell closed");
        Ok(())
    }

    #[instrument(skip(self, inv), fields(command = %inv.command))]
    pub fn dispatch(&mut self, inv: &Invocation) -> anyhow::Result<Flow> {
        debug!(args = ?inv.args, "dispatching command");
        let command = inv.command.as_str();
        let args = inv.args.as_slice();

        if !UNGATED.iter().any(|name| *name == command) && !self.ctx.onboarding_complete() {
            writeln!(self.out, "Let's finish setting things up first.\n")?;
            self.show("/onboarding")?;
            return Ok(Flow::Continue);
        }

        match command {
            "shell" => {
                writeln!(self.out, "Already in the shell.")?;
                Ok(())
            }
            "home" => self.show("/"),
            "tasks" => self.cmd_tasks(args),
            "progress" => self.show("/progress"),
            "settings" => self.show("/settings"),
            "go" => self.show(args.first().map(String::as_str).unwrap_or("/")),
            "add" => self.cmd_add(args),
            "done" | "toggle" => self.cmd_toggle(args),
            "delete" => self.cmd_delete(args),
            "plans" => self.cmd_plans(args),
            "plan" => self.cmd_plan(args),
            "spin" => self.cmd_spin(),
            "focus" => self.cmd_focus(args),
            "set" => self.cmd_set(args),
            "interval" => self.cmd_interval(args),
            "theme" => self.cmd_theme(args),
            "reminders" => self.cmd_reminders(args),
            "calendar" => self.cmd_calendar(args),
            "onboarding" => self.show("/onboarding"),
            "pick" => self.cmd_pick(args),
            "next" => self.cmd_next(),
            "back" => self.cmd_back(),
            "splash" => self.play_splash(),
            "help" => self.cmd_help(),
            "version" => {
                writeln!(self.out, "{}", env!("CARGO_PKG_VERSION"))?;
                Ok(())
            }
            "quit" | "exit" => return Ok(Flow::Quit),
            other => Err(anyhow!("unknown command: {other}")),
        }?;

        Ok(Flow::Continue)
    }

    fn show(&mut self, path: &str) -> anyhow::Result<()> {
        self.ctx.navigate(path);
        self.render_route()
    }

    fn render_route(&mut self) -> anyhow::Result<()> {
        let route = self.ctx.route().clone();
        let page = match &route {
            Route::Home => self.renderer.home(
                self.ctx.tasks.tasks(),
                self.ctx.tasks.summary(),
                self.ctx.now(),
                self.ctx.tz(),
            ),
            Route::Tasks { highlight } => self
                .renderer
                .task_table(self.ctx.tasks.tasks(), highlight.as_deref()),
            Route::Progress => self.renderer.progress(&self.ctx.progress_report()),
            Route::Settings => {
                let status = match self.ctx.notifications.initialize() {
                    Ok(()) => "enabled".to_string(),
                    Err(err) => err.to_string(),
                };
                self.renderer
                    .settings(&self.ctx.settings, self.ctx.theme.is_dark(), &status)
            }
            Route::Onboarding => self.renderer.onboarding(&self.ctx.onboarding),
        };

        if route.tab_index().is_some() {
            writeln!(self.out, "{}\n", self.renderer.tab_bar(&route))?;
        }
        write!(self.out, "{page}")?;
        Ok(())
    }

    fn resolve_id(&self, args: &[String]) -> anyhow::Result<String> {
        let needle = args.join(" ");
        if needle.trim().is_empty() {
            bail!("which task? give its number or id");
        }
        self.ctx
            .tasks
            .resolve(&needle)
            .map(|task| task.id.clone())
            .ok_or_else(|| anyhow!("no task matches {needle}"))
    }

    fn cmd_tasks(&mut self, args: &[String]) -> anyhow::Result<()> {
        if args.is_empty() {
            return self.show("/tasks");
        }
        let id = self.resolve_id(args)?;
        self.show(&format!("/tasks?highlight={id}"))
    }

    fn cmd_add(&mut self, args: &[String]) -> anyhow::Result<()> {
        let new = parse_new_task(args)?;
        let added = self.ctx.add_task(new)?;
        writeln!(self.out, "✨ Added {} {}", added.task.emoji, added.task.title)?;

        match added.reminder {
            ReminderOutcome::Scheduled { at, .. } => {
                writeln!(self.out, "⏰ Reminder set for {}", format_clock(at, self.ctx.tz()))?;
            }
            ReminderOutcome::InvalidTime => {
                writeln!(
                    self.out,
                    "Couldn't read the time {:?}; no reminder set.",
                    added.task.time.unwrap_or_default()
                )?;
            }
            ReminderOutcome::Failed(err) => {
                writeln!(self.out, "Reminder not scheduled: {err}")?;
            }
            ReminderOutcome::NoTime | ReminderOutcome::Disabled => {}
        }
        Ok(())
    }

    fn cmd_toggle(&mut self, args: &[String]) -> anyhow::Result<()> {
        let id = self.resolve_id(args)?;
        let toggled = self.ctx.toggle_task(&id);
        match toggled.outcome {
            ToggleOutcome::Completed(task) => {
                if toggled.celebrate {
                    write!(self.out, "{}", self.renderer.celebration(&task))?;
                } else {
                    writeln!(self.out, "✅ Completed {} {}", task.emoji, task.title)?;
                }
            }
            ToggleOutcome::Reopened(task) => {
                writeln!(self.out, "↩️ Reopened {} {}", task.emoji, task.title)?;
            }
            ToggleOutcome::NotFound => bail!("no task with id {id}"),
        }

        let summary = self.ctx.tasks.summary();
        writeln!(
            self.out,
            "{}/{} done. {}",
            summary.completed,
            summary.total,
            summary.motivational_message()
        )?;
        Ok(())
    }

    fn cmd_delete(&mut self, args: &[String]) -> anyhow::Result<()> {
        let is_yes = |arg: &String| arg == "-y" || arg == "--yes";
        let assume_yes = args.iter().any(is_yes);
        let rest: Vec<String> = args.iter().filter(|arg| !is_yes(*arg)).cloned().collect();
        let id = self.resolve_id(&rest)?;

        let Self { ctx, input, out, .. } = self;
        let removed = ctx.delete_task(&id, |task| assume_yes || confirm(input, out, &delete_prompt(task)));
        match removed {
            Some(task) => writeln!(out, "🗑️ Deleted {}", task.title)?,
            None => writeln!(out, "Kept it.")?,
        }
        Ok(())
    }

    fn cmd_plans(&mut self, args: &[String]) -> anyhow::Result<()> {
        let horizon = args
            .first()
            .map(|arg| arg.parse::<PlanHorizon>())
            .transpose()?
            .unwrap_or_default();
        write!(self.out, "{}", self.renderer.plans(horizon))?;
        Ok(())
    }

    fn cmd_plan(&mut self, args: &[String]) -> anyhow::Result<()> {
        if args.is_empty() {
            bail!("which plan? see `plans` for ids");
        }
        let added = self.ctx.apply_plan(&args.join(" "))?;
        writeln!(self.out, "📋 Added {} tasks:", added.len())?;
        for task in &added {
            writeln!(self.out, "  {} {} ({})", task.emoji, task.title, task.priority)?;
        }
        Ok(())
    }

    fn cmd_spin(&mut self) -> anyhow::Result<()> {
        self.ctx.spin_wheel()?;
        writeln!(self.out, "🎡 Spinning the wheel... ({}°)", self.ctx.wheel.rotation())?;

        let task = loop {
            if let Some(task) = self.ctx.poll_wheel() {
                break task;
            }
            let Some(due) = self.ctx.wheel.reveal_due_at() else {
                bail!("the wheel stopped without a pick");
            };
            let wait = (due - self.ctx.now()).clamp(
                Duration::milliseconds(1),
                Duration::milliseconds(WHEEL_POLL_MS),
            );
            self.ctx.sleep(wait);
        };

        writeln!(self.out, "🎯 Your next task: {} {}", task.emoji, task.title)?;
        writeln!(self.out, "Let's do it!\n")?;
        self.show(&format!("/tasks?highlight={}", task.id))
    }

    fn cmd_focus(&mut self, args: &[String]) -> anyhow::Result<()> {
        let (action, rest) = match args.split_first() {
            Some((action, rest)) => (action.as_str(), rest),
            None => ("status", args),
        };

        match action {
            "status" => {}
            "presets" => {
                write!(self.out, "{}", self.renderer.presets(self.ctx.focus.preset().id))?;
                return Ok(());
            }
            "select" => {
                let name = rest.join(" ");
                let preset = find_preset(&name)
                    .ok_or_else(|| anyhow!("no focus mode named {name}; see `focus presets`"))?;
                self.ctx.focus.select_preset(preset);
            }
            "start" => {
                if !self.ctx.focus.start() {
                    writeln!(self.out, "Already running.")?;
                }
            }
            "pause" => {
                if !self.ctx.focus.pause() {
                    writeln!(self.out, "Not running.")?;
                }
            }
            "reset" => self.ctx.focus.reset(),
            "advance" => {
                let seconds: u32 = rest
                    .first()
                    .context("how many seconds?")?
                    .parse()
                    .context("seconds must be a whole number")?;
                let outcome = self.ctx.focus_advance(seconds);
                self.report_tick(outcome)?;
            }
            "run" => self.focus_run()?,
            other => bail!("unknown focus action: {other}"),
        }

        write!(self.out, "{}", self.renderer.focus(&self.ctx.focus))?;
        Ok(())
    }

    /// Ticks once per second until the current session ends.
    fn focus_run(&mut self) -> anyhow::Result<()> {
        if self.ctx.focus.state() != TimerState::Running {
            self.ctx.focus.start();
        }
        loop {
            self.ctx.sleep(Duration::seconds(1));
            match self.ctx.focus_advance(1) {
                TickOutcome::Counted => {
                    let label = self.ctx.focus.current_session().label;
                    write!(self.out, "\r{label} {}", self.ctx.focus.display())?;
                    self.out.flush()?;
                }
                TickOutcome::Ignored => break,
                finished @ TickOutcome::SessionFinished { .. } => {
                    writeln!(self.out)?;
                    self.report_tick(finished)?;
                    break;
                }
            }
        }
        Ok(())
    }

    fn report_tick(&mut self, outcome: TickOutcome) -> anyhow::Result<()> {
        match outcome {
            TickOutcome::SessionFinished { finished, next } => writeln!(
                self.out,
                "🎉 {} complete! Up next: {} ({})",
                finished.label,
                next.label,
                format_countdown(next.duration_secs)
            )?,
            TickOutcome::Ignored => writeln!(self.out, "The timer isn't running; `focus start` first.")?,
            TickOutcome::Counted => {}
        }
        Ok(())
    }

    fn cmd_set(&mut self, args: &[String]) -> anyhow::Result<()> {
        let [key, value] = args else {
            bail!("usage: set <setting> <on|off>");
        };
        let toggle: Toggle = key.parse()?;
        let value = parse_switch(value)?;
        let warning = self.ctx.set_setting(toggle, value)?;
        writeln!(
            self.out,
            "{}: {}",
            toggle.label(),
            if value { "on" } else { "off" }
        )?;
        if let Some(err) = warning {
            writeln!(self.out, "⚠️ Saved, but notifications are unavailable: {err}")?;
        }
        Ok(())
    }

    fn cmd_interval(&mut self, args: &[String]) -> anyhow::Result<()> {
        let minutes: i64 = args
            .first()
            .context("usage: interval <minutes>")?
            .parse()
            .context("minutes must be a whole number")?;
        let warning = self.ctx.set_break_interval(minutes)?;
        writeln!(self.out, "⏱️ Break reminders every {minutes} minutes")?;
        if let Some(err) = warning {
            writeln!(self.out, "⚠️ Saved, but notifications are unavailable: {err}")?;
        }
        Ok(())
    }

    fn cmd_theme(&mut self, args: &[String]) -> anyhow::Result<()> {
        let is_dark = match args.first().map(String::as_str) {
            None | Some("toggle") => self.ctx.toggle_theme()?,
            Some("dark") => {
                self.ctx.theme.set_dark(&mut self.ctx.storage, true)?;
                true
            }
            Some("light") => {
                self.ctx.theme.set_dark(&mut self.ctx.storage, false)?;
                false
            }
            Some(other) => bail!("unknown theme: {other} (dark, light or toggle)"),
        };
        self.renderer.set_theme(self.ctx.theme.theme());
        writeln!(
            self.out,
            "{}",
            if is_dark { "🌙 Dark mode on" } else { "☀️ Light mode on" }
        )?;
        Ok(())
    }

    fn cmd_reminders(&mut self, args: &[String]) -> anyhow::Result<()> {
        match args.first().map(String::as_str) {
            None | Some("list") => {
                let pending = self.ctx.notifications.pending();
                write!(self.out, "{}", self.renderer.notifications(&pending, self.ctx.tz()))?;
            }
            Some("cancel") => {
                let id = parse_reminder_id(args.get(1))?;
                let ctx = &mut self.ctx;
                ctx.notifications.cancel(&mut ctx.storage, id)?;
                writeln!(self.out, "Cancelled reminder {id}")?;
            }
            Some("clear") => {
                let ctx = &mut self.ctx;
                let cancelled = ctx.notifications.cancel_all(&mut ctx.storage)?;
                writeln!(self.out, "Cancelled {cancelled} reminders")?;
            }
            Some("open") => {
                let id = parse_reminder_id(args.get(1))?;
                let record = self
                    .ctx
                    .notifications
                    .pending()
                    .into_iter()
                    .find(|record| record.id == id)
                    .ok_or_else(|| anyhow!("no pending reminder {id}"))?;
                let route = route_for_action(&record, "tap").unwrap_or(Route::Home);
                self.show(&route.path())?;
            }
            Some("motivation") => {
                let id = self.ctx.add_motivation_reminder()?;
                writeln!(self.out, "💫 Daily motivation scheduled (#{id})")?;
            }
            Some("break") => {
                let id = self.ctx.add_break_reminder()?;
                writeln!(
                    self.out,
                    "☕ Break reminder scheduled every hour, first in {} minutes (#{id})",
                    self.ctx.settings.break_interval_minutes
                )?;
            }
            Some(other) => bail!("unknown reminders action: {other}"),
        }
        Ok(())
    }

    fn cmd_calendar(&mut self, args: &[String]) -> anyhow::Result<()> {
        writeln!(self.out, "📅 Calendar sync is coming soon!")?;
        writeln!(
            self.out,
            "We're working on syncing your tasks with Google Calendar."
        )?;
        let connected = self.ctx.calendar.is_connected() || marked_connected(&self.ctx.storage);
        writeln!(
            self.out,
            "Status: {}",
            if connected { "connected" } else { "not connected" }
        )?;

        if let Some((action, rest)) = args.split_first() {
            if action.as_str() != "preview" {
                bail!("unknown calendar action: {action}");
            }
            let id = self.resolve_id(rest)?;
            let task = self
                .ctx
                .tasks
                .get(&id)
                .ok_or_else(|| anyhow!("no task with id {id}"))?;
            let event = event_for_task(task, self.ctx.now(), self.ctx.tz());
            writeln!(self.out, "\n{}", event.title)?;
            writeln!(
                self.out,
                "{} - {}",
                format_clock(event.start, self.ctx.tz()),
                format_clock(event.end, self.ctx.tz())
            )?;
            writeln!(self.out, "{}", event.description)?;
            if let Some(minutes) = event.reminder_minutes {
                writeln!(self.out, "Reminder {minutes} minutes before")?;
            }
        }
        Ok(())
    }

    fn cmd_pick(&mut self, args: &[String]) -> anyhow::Result<()> {
        let option: usize = args
            .first()
            .context("usage: pick <number>")?
            .parse()
            .context("pick takes an option number")?;
        if option == 0 {
            bail!("options are numbered from 1");
        }
        self.ctx.onboarding.select(option - 1)?;
        self.show("/onboarding")
    }

    fn cmd_next(&mut self) -> anyhow::Result<()> {
        if self.ctx.onboarding_complete() {
            bail!("onboarding is already finished");
        }
        match self.ctx.onboarding_next()? {
            Advance::Moved(_) => self.show("/onboarding"),
            Advance::Finished => {
                writeln!(self.out, "🎉 You're all set!\n")?;
                self.launch()?;
                self.show("/")
            }
        }
    }

    fn cmd_back(&mut self) -> anyhow::Result<()> {
        self.ctx.onboarding.back();
        self.show("/onboarding")
    }

    /// Runs the loading animation to completion against the context clock.
    pub fn play_splash(&mut self) -> anyhow::Result<()> {
        let mut splash = LoadingAnimation::start(self.ctx.now());
        while !splash.is_complete() {
            let now = self.ctx.now();
            splash.tick(now);
            write!(self.out, "\r{}", self.renderer.splash_frame(&splash, now))?;
            self.out.flush()?;

            let Some(due) = splash.next_due_at() else {
                break;
            };
            let wait = (due - now).clamp(
                Duration::milliseconds(1),
                Duration::milliseconds(SPLASH_FRAME_MS),
            );
            self.ctx.sleep(wait);
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn cmd_help(&mut self) -> anyhow::Result<()> {
        let lines = [
            ("home | tasks [n] | progress | settings", "show a page"),
            ("go <path>", "open a route such as /tasks?highlight=<id>"),
            (
                "add <title> [time:5:00 PM] [priority:low] [category:X] [emoji:E]",
                "add a task",
            ),
            ("done <n|id>", "toggle a task's completion"),
            ("delete <n|id> [-y]", "delete a task after confirming"),
            ("plans [today|week|month] | plan <id>", "browse or apply a pre-planned bundle"),
            ("spin", "let the decision wheel pick your next task"),
            (
                "focus [presets|select <mode>|start|pause|reset|run|advance <s>]",
                "focus timer",
            ),
            ("set <setting> <on|off> | interval <minutes>", "change settings"),
            ("theme [dark|light|toggle]", "switch the color theme"),
            (
                "reminders [list|cancel <id>|clear|open <id>|motivation|break]",
                "pending notifications",
            ),
            ("calendar [preview <n|id>]", "calendar sync (coming soon)"),
            ("onboarding | pick <n> | next | back", "first-run questions"),
            ("splash", "replay the welcome animation"),
            ("quit", "leave the shell"),
        ];
        for (usage, what) in lines {
            writeln!(self.out, "  {usage:<66} {what}")?;
        }
        Ok(())
    }
}

fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> bool {
    if write!(out, "{prompt} [y/N] ").and_then(|()| out.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(err) => {
            warn!(error = %err, "could not read confirmation");
            false
        }
    }
}

fn is_meridiem(token: &str) -> bool {
    let lowered = token.to_ascii_lowercase();
    matches!(lowered.trim_end_matches('.'), "am" | "pm" | "a.m" | "p.m")
}

/// Title words plus `time:`, `priority:`, `category:` and `emoji:`
/// modifiers. `time:5:00 PM` may span two tokens.
fn parse_new_task(args: &[String]) -> anyhow::Result<NewTask> {
    let mut new = NewTask::new("");
    let mut title_words: Vec<&str> = Vec::new();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("time:") {
            let mut time = value.to_string();
            if let Some(meridiem) = iter.next_if(|next| is_meridiem(next)) {
                time.push(' ');
                time.push_str(meridiem);
            }
            new.time = Some(time).filter(|time| !time.trim().is_empty());
        } else if let Some(value) = arg.strip_prefix("priority:") {
            new.priority = value.parse::<Priority>()?;
        } else if let Some(value) = arg.strip_prefix("category:") {
            new.category = value.to_string();
        } else if let Some(value) = arg.strip_prefix("emoji:") {
            new.emoji = value.to_string();
        } else {
            title_words.push(arg);
        }
    }

    new.title = title_words.join(" ");
    Ok(new)
}

fn parse_switch(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(anyhow!("expected on or off, got {other}")),
    }
}

fn parse_reminder_id(arg: Option<&String>) -> anyhow::Result<u32> {
    arg.context("which reminder? see `reminders`")?
        .parse::<u32>()
        .context("reminder ids are numbers")
}
