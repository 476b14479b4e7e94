use std::fmt;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Tasks { highlight: Option<String> },
    Progress,
    Settings,
    Onboarding,
}

/// Tab bar order.
pub const TABS: &[(&str, &str)] = &[
    ("/", "🏠 Home"),
    ("/tasks", "📋 Tasks"),
    ("/progress", "📈 Progress"),
    ("/settings", "⚙️ Settings"),
];

impl Route {
    /// Unknown paths land on home.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let (base, query) = trimmed.split_once('?').unwrap_or((trimmed, ""));
        let base = base.trim_end_matches('/');
        match base.trim_start_matches('/') {
            "" | "home" => Route::Home,
            "tasks" => Route::Tasks {
                highlight: query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("highlight="))
                    .filter(|id| !id.is_empty())
                    .map(ToString::to_string),
            },
            "progress" => Route::Progress,
            "settings" => Route::Settings,
            "onboarding" => Route::Onboarding,
            other => {
                debug!(path = %other, "unknown route; redirecting home");
                Route::Home
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Tasks { highlight: None } => "/tasks".to_string(),
            Route::Tasks {
                highlight: Some(id),
            } => format!("/tasks?highlight={id}"),
            Route::Progress => "/progress".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Onboarding => "/onboarding".to_string(),
        }
    }

    /// Until onboarding is done every route resolves to onboarding.
    pub fn gate(self, onboarding_complete: bool) -> Self {
        if onboarding_complete {
            match self {
                Route::Onboarding => Route::Home,
                other => other,
            }
        } else {
            Route::Onboarding
        }
    }

    pub fn tab_index(&self) -> Option<usize> {
        match self {
            Route::Home => Some(0),
            Route::Tasks { .. } => Some(1),
            Route::Progress => Some(2),
            Route::Settings => Some(3),
            Route::Onboarding => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/tasks"), Route::Tasks { highlight: None });
        assert_eq!(Route::parse("progress/"), Route::Progress);
        assert_eq!(Route::parse("/settings"), Route::Settings);
    }

    #[test]
    fn unknown_paths_redirect_home() {
        assert_eq!(Route::parse("/calendar"), Route::Home);
        assert_eq!(Route::parse("/tasks/extra"), Route::Home);
    }

    #[test]
    fn highlight_query_round_trips() {
        let route = Route::parse("/tasks?highlight=abc123");
        assert_eq!(
            route,
            Route::Tasks {
                highlight: Some("abc123".to_string())
            }
        );
        assert_eq!(route.path(), "/tasks?highlight=abc123");
    }

    #[test]
    fn onboarding_gates_everything_until_complete() {
        assert_eq!(Route::Progress.gate(false), Route::Onboarding);
        assert_eq!(Route::Progress.gate(true), Route::Progress);
        assert_eq!(Route::Onboarding.gate(true), Route::Home);
    }
}
