use std::sync::OnceLock;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Duration,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;

const TIMEZONE_ENV_VAR: &str =
  "DAILYFLOW_TIMEZONE";

/// Minutes between a task reminder and
/// the task's time of day.
pub const DEFAULT_REMINDER_LEAD_MINUTES:
  i64 = 15;

/// Resolves the zone used for "today"
/// and for time-of-day strings.
///
/// Order: explicit config value, then
/// `DAILYFLOW_TIMEZONE`, then `TZ`, then
/// UTC.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  for var in [TIMEZONE_ENV_VAR, "TZ"] {
    if let Ok(raw) = std::env::var(var)
      && let Some(tz) =
        parse_timezone(&raw, var)
    {
      return tz;
    }
  }

  tracing::info!(
    "no timezone configured; using \
     UTC"
  );
  chrono_tz::UTC
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::debug!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "resolved timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::warn!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

#[must_use]
pub fn to_local_date(
  dt: DateTime<Utc>,
  tz: &Tz
) -> NaiveDate {
  dt.with_timezone(tz).date_naive()
}

/// Parses `5:00 PM`, `5:00pm`,
/// `12:30 AM` or 24h `17:00` into
/// `(hour, minute)`.
pub fn parse_time_of_day(
  token: &str
) -> Option<(u32, u32)> {
  static CLOCK_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  let clock_re = CLOCK_RE
    .get_or_init(|| {
      Regex::new(
        r"(?i)^(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<ampm>[ap]\.?m\.?)?$",
      )
      .ok()
    })
    .as_ref()?;
  let captures =
    clock_re.captures(token.trim())?;

  let raw_hour = captures
    .name("hour")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  let minute = captures
    .name("minute")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  if minute > 59 {
    return None;
  }

  let hour = if let Some(ampm_match) =
    captures.name("ampm")
  {
    let ampm = ampm_match
      .as_str()
      .replace('.', "")
      .to_ascii_lowercase();
    if raw_hour == 0 || raw_hour > 12 {
      return None;
    }
    match ampm.as_str() {
      | "am" => {
        if raw_hour == 12 {
          0
        } else {
          raw_hour
        }
      }
      | "pm" => {
        if raw_hour == 12 {
          12
        } else {
          raw_hour + 12
        }
      }
      | _ => return None
    }
  } else {
    if raw_hour > 23 {
      return None;
    }
    raw_hour
  };

  Some((hour, minute))
}

fn to_utc_from_local(
  local_naive: NaiveDateTime,
  tz: &Tz,
  context: &str
) -> anyhow::Result<DateTime<Utc>> {
  match tz
    .from_local_datetime(&local_naive)
  {
    | LocalResult::Single(local_dt) => {
      Ok(local_dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::warn!(
        context,
        first = %first,
        second = %second,
        "ambiguous local datetime; using earliest"
      );
      let chosen = if first <= second {
        first
      } else {
        second
      };
      Ok(chosen.with_timezone(&Utc))
    }
    | LocalResult::None => {
      Err(anyhow!(
        "local datetime does not \
         exist in {tz}: {context}"
      ))
    }
  }
}

/// Absolute instant of a time-of-day
/// string on the current local date.
#[tracing::instrument(skip(now, tz))]
pub fn time_today(
  time_of_day: &str,
  now: DateTime<Utc>,
  tz: &Tz
) -> anyhow::Result<DateTime<Utc>> {
  let (hour, minute) =
    parse_time_of_day(time_of_day)
      .ok_or_else(|| {
        anyhow!(
          "unrecognized time of day: \
           {time_of_day}"
        )
      })?;
  let date = to_local_date(now, tz);
  let naive = date
    .and_hms_opt(hour, minute, 0)
    .ok_or_else(|| {
      anyhow!(
        "invalid clock time \
         {hour}:{minute:02}"
      )
    })?;
  to_utc_from_local(
    naive,
    tz,
    time_of_day
  )
}

/// When to remind about a task that
/// happens at `time_of_day` today.
pub fn reminder_time(
  time_of_day: &str,
  now: DateTime<Utc>,
  tz: &Tz,
  lead_minutes: i64
) -> anyhow::Result<DateTime<Utc>> {
  Ok(
    time_today(time_of_day, now, tz)?
      - Duration::minutes(lead_minutes)
  )
}

/// Local instant for `hour:00` on the
/// day after `now`.
pub fn tomorrow_at(
  now: DateTime<Utc>,
  tz: &Tz,
  hour: u32
) -> anyhow::Result<DateTime<Utc>> {
  let date = to_local_date(now, tz)
    .succ_opt()
    .ok_or_else(|| {
      anyhow!("date out of range")
    })?;
  let naive = date
    .and_hms_opt(hour, 0, 0)
    .ok_or_else(|| {
      anyhow!("invalid hour {hour}")
    })?;
  to_utc_from_local(
    naive, tz, "tomorrow"
  )
}

/// `MM:SS` with minutes unbounded.
#[must_use]
pub fn format_countdown(
  seconds: u32
) -> String {
  format!(
    "{:02}:{:02}",
    seconds / 60,
    seconds % 60
  )
}

/// `4:45 PM` style clock label.
#[must_use]
pub fn format_clock(
  dt: DateTime<Utc>,
  tz: &Tz
) -> String {
  dt.with_timezone(tz)
    .format("%-I:%M %p")
    .to_string()
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Utc
  };

  use super::{
    format_clock,
    format_countdown,
    parse_time_of_day,
    reminder_time,
    time_today,
    tomorrow_at
  };

  #[test]
  fn parses_twelve_hour_clock() {
    assert_eq!(
      parse_time_of_day("5:00 PM"),
      Some((17, 0))
    );
    assert_eq!(
      parse_time_of_day("7:30am"),
      Some((7, 30))
    );
    assert_eq!(
      parse_time_of_day("12:15 AM"),
      Some((0, 15))
    );
    assert_eq!(
      parse_time_of_day("12:00 PM"),
      Some((12, 0))
    );
  }

  #[test]
  fn parses_twenty_four_hour_clock() {
    assert_eq!(
      parse_time_of_day("17:45"),
      Some((17, 45))
    );
    assert_eq!(
      parse_time_of_day("24:00"),
      None
    );
    assert_eq!(
      parse_time_of_day("13:00 PM"),
      None
    );
    assert_eq!(
      parse_time_of_day("soon"),
      None
    );
  }

  #[test]
  fn reminder_is_fifteen_minutes_early_on_same_day()
  {
    let tz = chrono_tz::America::New_York;
    let now = tz
      .with_ymd_and_hms(
        2026, 5, 4, 9, 12, 0
      )
      .single()
      .expect("valid now")
      .with_timezone(&Utc);

    let at = reminder_time(
      "5:00 PM", now, &tz, 15
    )
    .expect("reminder");
    let local = at.with_timezone(&tz);
    assert_eq!(
      local
        .format("%Y-%m-%d %H:%M")
        .to_string(),
      "2026-05-04 16:45"
    );
    assert_eq!(
      format_clock(at, &tz),
      "4:45 PM"
    );
  }

  #[test]
  fn time_today_rejects_garbage() {
    let now = Utc
      .with_ymd_and_hms(
        2026, 5, 4, 9, 0, 0
      )
      .single()
      .expect("valid now");
    assert!(
      time_today(
        "after lunch",
        now,
        &chrono_tz::UTC
      )
      .is_err()
    );
  }

  #[test]
  fn tomorrow_at_nine() {
    let now = Utc
      .with_ymd_and_hms(
        2026, 12, 31, 22, 0, 0
      )
      .single()
      .expect("valid now");
    let at = tomorrow_at(
      now,
      &chrono_tz::UTC,
      9
    )
    .expect("tomorrow");
    assert_eq!(
      at.format("%Y-%m-%d %H:%M")
        .to_string(),
      "2027-01-01 09:00"
    );
  }

  #[test]
  fn countdown_formatting() {
    assert_eq!(
      format_countdown(300),
      "05:00"
    );
    assert_eq!(
      format_countdown(59),
      "00:59"
    );
    assert_eq!(
      format_countdown(45 * 60),
      "45:00"
    );
  }
}
