//! Calendar sync. Dormant: the front-end only shows a "coming soon" page,
//! but the client speaks the Google Calendar v3 REST shape.

use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::datetime::time_today;
use crate::storage::{CALENDAR_CONNECTED_KEY, LocalStorage};
use crate::task::Task;

pub const GOOGLE_CALENDAR_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const EVENT_REMINDER_MINUTES: i64 = 15;
const SOURCE_TAG: &str = "dailyflow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reminder_minutes: Option<i64>,
    pub task_id: Option<String>,
}

/// A one-hour event at the task's time today, or starting now when the
/// task has no usable time.
pub fn event_for_task(task: &Task, now: DateTime<Utc>, tz: &Tz) -> CalendarEvent {
    let start = task
        .time
        .as_deref()
        .and_then(|time| match time_today(time, now, tz) {
            Ok(start) => Some(start),
            Err(err) => {
                warn!(error = %err, "task time unusable; starting event now");
                None
            }
        })
        .unwrap_or(now);
    CalendarEvent {
        id: None,
        title: format!("{} {}", task.emoji, task.title),
        description: format!(
            "DailyFlow Task - Category: {}\nPriority: {}",
            task.category, task.priority
        ),
        start,
        end: start + Duration::hours(1),
        reminder_minutes: Some(EVENT_REMINDER_MINUTES),
        task_id: Some(task.id.clone()),
    }
}

pub trait CalendarProvider {
    fn is_connected(&self) -> bool;
    fn sign_in(&mut self) -> anyhow::Result<bool>;
    fn sign_out(&mut self) -> anyhow::Result<()>;
    fn create_event(&self, event: &CalendarEvent) -> anyhow::Result<String>;
    fn update_event(&self, id: &str, event: &CalendarEvent) -> anyhow::Result<()>;
    fn delete_event(&self, id: &str) -> anyhow::Result<()>;
    fn list_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<Vec<CalendarEvent>>;
}

pub fn marked_connected(storage: &LocalStorage) -> bool {
    storage.get_or(CALENDAR_CONNECTED_KEY, false)
}

pub fn mark_connected(storage: &mut LocalStorage, connected: bool) -> anyhow::Result<()> {
    if connected {
        storage.set(CALENDAR_CONNECTED_KEY, &true)
    } else {
        storage.remove(CALENDAR_CONNECTED_KEY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default)]
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dailyflow_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtendedProperties {
    #[serde(default)]
    pub private: PrivateProperties,
}

/// `events` resource as sent to and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

impl WireEvent {
    pub fn from_event(event: &CalendarEvent, tz: &Tz) -> Self {
        let time = |at| EventTime {
            date_time: Some(at),
            time_zone: Some(tz.name().to_string()),
        };
        let overrides = event
            .reminder_minutes
            .map(|minutes| {
                ["popup", "email"]
                    .into_iter()
                    .map(|method| ReminderOverride {
                        method: method.to_string(),
                        minutes,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: None,
            summary: Some(event.title.clone()),
            description: Some(event.description.clone()),
            start: time(event.start),
            end: time(event.end),
            reminders: Some(Reminders {
                use_default: false,
                overrides,
            }),
            extended_properties: Some(ExtendedProperties {
                private: PrivateProperties {
                    dailyflow_task_id: event.task_id.clone(),
                    source: Some(SOURCE_TAG.to_string()),
                },
            }),
        }
    }

    /// `None` for all-day events, which carry no instant.
    pub fn into_event(self) -> Option<CalendarEvent> {
        let start = self.start.date_time?;
        let end = self.end.date_time?;
        Some(CalendarEvent {
            id: self.id,
            title: self.summary.unwrap_or_else(|| "Untitled".to_string()),
            description: self.description.unwrap_or_default(),
            start,
            end,
            reminder_minutes: self
                .reminders
                .and_then(|reminders| reminders.overrides.first().map(|o| o.minutes)),
            task_id: self
                .extended_properties
                .and_then(|props| props.private.dailyflow_task_id),
        })
    }
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<WireEvent>,
}

/// Talks to the `primary` calendar with a bearer token from configuration.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    client: reqwest::blocking::Client,
    base_url: String,
    access_token: Option<String>,
    tz: Tz,
    connected: bool,
}

impl GoogleCalendarClient {
    pub fn new(access_token: Option<String>, tz: Tz) -> Self {
        Self::with_base_url(GOOGLE_CALENDAR_BASE, access_token, tz)
    }

    pub fn with_base_url(base_url: &str, access_token: Option<String>, tz: Tz) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.filter(|token| !token.trim().is_empty()),
            tz,
            connected: false,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.base_url)
    }

    fn token(&self) -> anyhow::Result<&str> {
        if !self.connected {
            bail!("calendar not connected");
        }
        self.access_token
            .as_deref()
            .ok_or_else(|| anyhow!("no calendar access token configured"))
    }

    fn check(response: reqwest::blocking::Response) -> anyhow::Result<reqwest::blocking::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_else(|_| "Unknown error".to_string());
        Err(anyhow!("calendar API error ({status}): {body}"))
    }
}

impl CalendarProvider for GoogleCalendarClient {
    fn is_connected(&self) -> bool {
        self.connected
    }

    #[instrument(skip(self))]
    fn sign_in(&mut self) -> anyhow::Result<bool> {
        self.connected = self.access_token.is_some();
        info!(connected = self.connected, "calendar sign-in");
        Ok(self.connected)
    }

    fn sign_out(&mut self) -> anyhow::Result<()> {
        self.connected = false;
        info!("calendar signed out");
        Ok(())
    }

    #[instrument(skip(self, event), fields(title = %event.title))]
    fn create_event(&self, event: &CalendarEvent) -> anyhow::Result<String> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(token)
            .json(&WireEvent::from_event(event, &self.tz))
            .send()
            .context("calendar create request failed")?;
        let created: WireEvent = Self::check(response)?
            .json()
            .context("failed to parse created event")?;
        let id = created
            .id
            .ok_or_else(|| anyhow!("created event has no id"))?;
        debug!(%id, "calendar event created");
        Ok(id)
    }

    #[instrument(skip(self, event))]
    fn update_event(&self, id: &str, event: &CalendarEvent) -> anyhow::Result<()> {
        let token = self.token()?;
        let response = self
            .client
            .put(format!("{}/{id}", self.events_url()))
            .bearer_auth(token)
            .json(&WireEvent::from_event(event, &self.tz))
            .send()
            .context("calendar update request failed")?;
        Self::check(response)?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete_event(&self, id: &str) -> anyhow::Result<()> {
        let token = self.token()?;
        let response = self
            .client
            .delete(format!("{}/{id}", self.events_url()))
            .bearer_auth(token)
            .send()
            .context("calendar delete request failed")?;
        Self::check(response)?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<Vec<CalendarEvent>> {
        if !self.connected {
            return Ok(Vec::new());
        }
        let token = self.token()?;
        let url = format!(
            "{}?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            self.events_url(),
            from.to_rfc3339_opts(SecondsFormat::Secs, true),
            to.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .context("calendar list request failed")?;
        let list: EventList = Self::check(response)?
            .json()
            .context("failed to parse event list")?;
        Ok(list.items.into_iter().filter_map(WireEvent::into_event).collect())
    }
}
