use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use anyhow::anyhow;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::focus::{FocusTimer, PRESETS, SessionKind, TimerState};
use crate::loading::LoadingAnimation;
use crate::notify::NotificationRecord;
use crate::onboarding::{Onboarding, StepKind};
use crate::plans::{PlanHorizon, plans_for};
use crate::progress::ProgressReport;
use crate::routes::{Route, TABS};
use crate::settings::{BREAK_INTERVAL_CHOICES, Settings, TOGGLES};
use crate::task::Task;
use crate::task_list::Summary;
use crate::theme::{Theme, hex_to_rgb};

const BAR_WIDTH: usize = 20;

/// Turns pages into text. Colors come from the active theme palette.
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    theme: &'static Theme,
}

impl Renderer {
    pub fn new(cfg: &Config, theme: &'static Theme) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => io::stdout().is_terminal(),
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color, theme })
    }

    pub fn plain(theme: &'static Theme) -> Self {
        Self {
            color: false,
            theme,
        }
    }

    pub fn set_theme(&mut self, theme: &'static Theme) {
        self.theme = theme;
    }

    fn paint(&self, text: &str, hex: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        match hex_to_rgb(hex) {
            Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
            None => text.to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn bar(&self, percent: f64) -> String {
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
        format!(
            "{}{}",
            self.paint(&"█".repeat(filled), self.theme.colors.success),
            self.paint(&"░".repeat(BAR_WIDTH - filled), self.theme.colors.border)
        )
    }

    pub fn tab_bar(&self, route: &Route) -> String {
        let active = route.tab_index();
        TABS.iter()
            .enumerate()
            .map(|(idx, (_, label))| {
                if Some(idx) == active {
                    self.paint(&format!("[{label}]"), self.theme.colors.primary)
                } else {
                    format!(" {label} ")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    pub fn home(&self, tasks: &[Task], summary: Summary, now: DateTime<Utc>, tz: &Tz) -> String {
        let local = now.with_timezone(tz);
        let greeting = match local.hour() {
            0..=11 => "Good morning",
            12..=16 => "Good afternoon",
            _ => "Good evening",
        };
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold(&format!("{greeting}! 👋")));
        let _ = writeln!(out, "{}", local.format("%A, %B %-d"));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Today's progress  {} {}/{} ({:.0}%)",
            self.bar(summary.percent),
            summary.completed,
            summary.total,
            summary.percent
        );
        let _ = writeln!(out, "{}", summary.motivational_message());
        let _ = writeln!(out);
        out.push_str(&self.task_table(tasks, None));
        out
    }

    pub fn task_table(&self, tasks: &[Task], highlight: Option<&str>) -> String {
        if tasks.is_empty() {
            return "No tasks yet. Add one with `add <title>`.\n".to_string();
        }
        let headers = ["#", "", "Task", "Priority", "Time", "Category", "ID"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let rows = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let check = if task.completed { "✅" } else { "⬜" };
                let mut title = format!("{} {}", task.emoji, task.title);
                if highlight == Some(task.id.as_str()) {
                    title = self.paint(&format!("» {title}"), self.theme.colors.accent);
                } else if task.completed {
                    title = self.paint(&title, self.theme.colors.text_secondary);
                }
                vec![
                    (idx + 1).to_string(),
                    check.to_string(),
                    title,
                    self.paint(task.priority.as_str(), task.priority.hex_color()),
                    task.time.clone().unwrap_or_default(),
                    task.category.clone(),
                    task.id.chars().take(8).collect(),
                ]
            })
            .collect();
        write_table(headers, rows)
    }

    pub fn celebration(&self, task: &Task) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint("🎉 Amazing!", self.theme.colors.primary));
        let _ = writeln!(out, "\"{}\"", task.title);
        let _ = writeln!(out, "Task completed! 🌟");
        let _ = writeln!(out, "Your ADHD brain just conquered another challenge! 💪");
        let _ = writeln!(out, "Every small win builds momentum. Keep going! ✨");
        out
    }

    pub fn plans(&self, horizon: PlanHorizon) -> String {
        let mut out = String::new();
        for plan in plans_for(horizon) {
            let _ = writeln!(
                out,
                "{} {}  {}  [{}] ~{}",
                plan.emoji,
                self.paint(plan.title, plan.color),
                plan.description,
                plan.id,
                plan.estimated_time
            );
            for task in plan.tasks {
                let _ = writeln!(out, "    {task}");
            }
        }
        out
    }

    pub fn presets(&self, active: &str) -> String {
        let mut out = String::new();
        for preset in PRESETS {
            let marker = if preset.id == active { "●" } else { "○" };
            let _ = writeln!(
                out,
                "{marker} {} {:<20} {}  [{}]",
                preset.emoji, preset.name, preset.description, preset.id
            );
        }
        out
    }

    pub fn focus(&self, timer: &FocusTimer) -> String {
        let session = timer.current_session();
        let color = match session.kind {
            SessionKind::Work => self.theme.colors.primary,
            SessionKind::Break => self.theme.colors.success,
        };
        let state = match timer.state() {
            TimerState::Idle => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::SessionComplete => "session complete",
        };
        let preset = timer.preset();
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", preset.emoji, self.bold(preset.name));
        let _ = writeln!(out, "{}  {}", self.paint(session.label, color), self.bold(&timer.display()));
        let _ = writeln!(out, "{} {:.0}%", self.bar(timer.progress_percent()), timer.progress_percent());
        let _ = writeln!(
            out,
            "Sessions completed: {}  ({state})",
            timer.completed_sessions()
        );
        out
    }

    pub fn progress(&self, report: &ProgressReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold("📈 Your Progress"));
        let _ = writeln!(
            out,
            "Today {}  {}/{} tasks  {}",
            report.mood,
            report.today_completed,
            report.today_total,
            self.bar(report.today_percent)
        );
        let _ = writeln!(out);

        let peak = report
            .days
            .iter()
            .map(|day| day.added.max(day.completed))
            .max()
            .unwrap_or(0)
            .max(1);
        for day in &report.days {
            let width = (day.completed as usize * BAR_WIDTH) / peak as usize;
            let _ = writeln!(
                out,
                "{} {} {:>2} done / {:>2} added  {}",
                day.label,
                day.date.format("%m-%d"),
                day.completed,
                day.added,
                self.paint(&"▇".repeat(width), self.theme.colors.primary)
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "🔥 Streak {} days   ✅ Total {}   🎯 Success {}%   📅 Active {} days   🧘 Focus {}",
            report.current_streak,
            report.total_completed,
            report.success_rate,
            report.days_active,
            report.focus_sessions
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.bold("🏆 Achievements"));
        for achievement in &report.achievements {
            let line = format!(
                "{} {} - {}",
                achievement.emoji, achievement.title, achievement.description
            );
            let line = if achievement.unlocked {
                line
            } else {
                self.paint(&format!("🔒 {line}"), self.theme.colors.text_secondary)
            };
            let _ = writeln!(out, "  {line}");
        }
        out
    }

    pub fn settings(&self, settings: &Settings, is_dark: bool, notifications: &str) -> String {
        let on_off = |value: bool| {
            if value {
                self.paint("on", self.theme.colors.success)
            } else {
                self.paint("off", self.theme.colors.text_secondary)
            }
        };
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold("⚙️ Settings"));
        let _ = writeln!(out, "  {:<30} {}", "🌙 Dark Mode [theme]", on_off(is_dark));
        for toggle in TOGGLES {
            let label = format!("{} [{}]", toggle.label(), toggle.key());
            let _ = writeln!(out, "  {label:<30} {}", on_off(settings.get(*toggle)));
        }
        let _ = writeln!(
            out,
            "  {:<30} {} min (choices: {BREAK_INTERVAL_CHOICES:?})",
            "⏱️ Break interval [interval]", settings.break_interval_minutes
        );
        let _ = writeln!(out, "  Notifications: {notifications}");
        out
    }

    pub fn notifications(&self, pending: &[NotificationRecord], tz: &Tz) -> String {
        if pending.is_empty() {
            return "No pending notifications.\n".to_string();
        }
        let headers = ["ID", "When", "Repeats", "Title", "Body"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let rows = pending
            .iter()
            .map(|record| {
                let (when, repeats) = match &record.schedule {
                    Some(schedule) => (
                        schedule
                            .at
                            .with_timezone(tz)
                            .format("%Y-%m-%d %-I:%M %p")
                            .to_string(),
                        schedule
                            .every
                            .filter(|_| schedule.repeats)
                            .map(|every| format!("{every:?}").to_ascii_lowercase())
                            .unwrap_or_default(),
                    ),
                    None => ("now".to_string(), String::new()),
                };
                vec![
                    record.id.to_string(),
                    when,
                    repeats,
                    record.title.clone(),
                    record.body.clone(),
                ]
            })
            .collect();
        write_table(headers, rows)
    }

    pub fn onboarding(&self, flow: &Onboarding) -> String {
        let step = flow.step();
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold(step.title));
        let _ = writeln!(out, "{}", step.subtitle);
        if let StepKind::Choice { options, .. } = step.kind {
            for (idx, option) in options.iter().enumerate() {
                let marker = if flow.selection() == Some(idx) { "●" } else { "○" };
                let _ = writeln!(out, "  {marker} {}. {option}", idx + 1);
            }
            let _ = writeln!(out, "Pick with `pick <n>`, then `next`.");
        } else if flow.is_last() {
            let _ = writeln!(out, "Type `next` to get started.");
        } else {
            let _ = writeln!(out, "Type `next` to continue.");
        }
        out
    }

    pub fn splash_frame(&self, splash: &LoadingAnimation, now: DateTime<Utc>) -> String {
        let logo = if splash.logo_visible() {
            self.paint("✨ DailyFlow ✨", self.theme.colors.primary)
        } else {
            String::new()
        };
        let progress = splash.progress(now);
        format!(
            "{logo}  {} {progress:>3}%  {}",
            self.bar(f64::from(progress)),
            splash.message().unwrap_or_default()
        )
    }
}

fn write_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let mut out = String::new();
    for idx in 0..column_count {
        let _ = write!(out, "{:width$} ", headers[idx], width = widths[idx]);
    }
    out.push('\n');

    for width in &widths {
        let _ = write!(out, "{:-<width$} ", "");
    }
    out.push('\n');

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            let _ = write!(out, "{}{} ", cell, " ".repeat(padding));
        }
        out.push('\n');
    }

    out
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, strip_ansi, write_table};
    use crate::routes::Route;
    use crate::task::seed_tasks;
    use crate::theme::LIGHT;

    #[test]
    fn table_pads_by_display_width() {
        let table = write_table(
            vec!["A".to_string(), "B".to_string()],
            vec![vec!["🛒".to_string(), "x".to_string()], vec!["ab".to_string(), "y".to_string()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "A  B ");
        assert_eq!(lines[2], "🛒 x ");
        assert_eq!(lines[3], "ab y ");
    }

    #[test]
    fn highlighted_task_is_marked() {
        let renderer = Renderer::plain(&LIGHT);
        let tasks = seed_tasks();
        let table = renderer.task_table(&tasks, Some("3"));
        assert!(table.contains("» 🛒 Buy groceries"));
        assert!(!table.contains("» 📚"));
    }

    #[test]
    fn tab_bar_brackets_active_tab() {
        let renderer = Renderer::plain(&LIGHT);
        let bar = renderer.tab_bar(&Route::Progress);
        assert!(bar.contains("[📈 Progress]"));
        assert!(!bar.contains("[🏠 Home]"));
    }

    #[test]
    fn strips_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[38;2;1;2;3mhi\x1b[0m"), "hi");
    }
}
