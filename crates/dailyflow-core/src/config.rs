use std::collections::BTreeMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

const RC_ENV_VAR: &str = "DAILYFLOWRC";
const RC_FILE_NAME: &str =
  ".dailyflowrc";
const DATA_DIR_NAME: &str =
  ".dailyflow";

const DEFAULTS: &[(&str, &str)] = &[
  ("data.location", "~/.dailyflow"),
  ("color", "on"),
  ("splash", "on"),
  ("reminder.lead_minutes", "15"),
  ("wheel.reveal_ms", "3000"),
  ("notifications.host", "file"),
  (
    "notifications.permission",
    "granted"
  ),
  ("haptics", "bell")
];

/// Layered `key = value` settings:
/// built-in defaults, then the rc file
/// (with its includes), then command
/// line overrides.
#[derive(Debug, Clone)]
pub struct Config {
  map: BTreeMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationHostKind {
  File,
  None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticsKind {
  Bell,
  None
}

impl Default for Config {
  fn default() -> Self {
    Self {
      map:          DEFAULTS
        .iter()
        .map(|(k, v)| {
          (k.to_string(), v.to_string())
        })
        .collect(),
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    match resolve_rc_path(rc_override)?
    {
      | Some(path) => {
        info!(rc = %path.display(), "loading dailyflowrc");
        cfg.load_file(&path)?;
      }
      | None => {
        debug!(
          "no dailyflowrc found; \
           using defaults"
        );
      }
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  /// Falls back to `default` with a
  /// warning when the value is not an
  /// integer.
  pub fn get_i64_or(
    &self,
    key: &str,
    default: i64
  ) -> i64 {
    match self.map.get(key) {
      | None => default,
      | Some(raw) => {
        raw.trim().parse().unwrap_or_else(
          |_| {
            warn!(key, value = %raw, "expected an integer; using default");
            default
          }
        )
      }
    }
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  pub fn color_enabled(&self) -> bool {
    self
      .get_bool("color")
      .unwrap_or(true)
  }

  pub fn splash_enabled(&self) -> bool {
    self
      .get_bool("splash")
      .unwrap_or(true)
  }

  pub fn timezone(
    &self
  ) -> Option<String> {
    self
      .get("timezone")
      .filter(|tz| !tz.trim().is_empty())
  }

  pub fn reminder_lead_minutes(
    &self
  ) -> i64 {
    self
      .get_i64_or(
        "reminder.lead_minutes",
        crate::datetime::DEFAULT_REMINDER_LEAD_MINUTES
      )
      .max(0)
  }

  pub fn wheel_reveal_ms(&self) -> i64 {
    self
      .get_i64_or(
        "wheel.reveal_ms",
        crate::wheel::DEFAULT_REVEAL_MS
      )
      .max(0)
  }

  pub fn notification_host(
    &self
  ) -> NotificationHostKind {
    match self
      .get("notifications.host")
      .unwrap_or_default()
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "none" | "off" => {
        NotificationHostKind::None
      }
      | _ => NotificationHostKind::File
    }
  }

  pub fn notification_permission_granted(
    &self
  ) -> bool {
    !matches!(
      self
        .get("notifications.permission")
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
        .as_str(),
      "denied" | "off" | "no" | "false"
    )
  }

  pub fn haptics(&self) -> HapticsKind {
    match self
      .get("haptics")
      .unwrap_or_default()
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "none" | "off" => {
        HapticsKind::None
      }
      | _ => HapticsKind::Bell
    }
  }

  pub fn calendar_access_token(
    &self
  ) -> Option<String> {
    self
      .get("calendar.access_token")
      .filter(|t| !t.trim().is_empty())
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = match raw_line
        .split_once('#')
      {
        | Some((before, _)) => {
          before.trim()
        }
        | None => raw_line.trim()
      };
      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
          include = %include_path.display(),
          line = line_num + 1,
          "processing include"
        );

        if include_path
          == path
          || self
            .loaded_files
            .contains(&include_path)
        {
          warn!(include = %include_path.display(), "include cycle; skipping");
        } else if include_path.exists()
        {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Explicit override, then the config
/// value, then `~/.dailyflow`. Created
/// on demand.
#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    home_dir()?.join(DATA_DIR_NAME)
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env.is_empty()
      || rc_env == "/dev/null"
    {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping rc file"
    );
    return Ok(None);
  };
  let candidate =
    home.join(RC_FILE_NAME);
  Ok(candidate.exists().then_some(
    candidate
  ))
}

fn home_dir() -> anyhow::Result<PathBuf>
{
  dirs::home_dir().ok_or_else(|| {
    anyhow!(
      "cannot determine home directory"
    )
  })
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let expanded =
    expand_tilde(Path::new(include));
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
