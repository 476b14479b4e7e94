//! Light/dark palettes and the persisted dark-mode preference.

use tracing::{info, instrument};

use crate::storage::{LocalStorage, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradients {
    pub primary: [&'static str; 3],
    pub secondary: [&'static str; 3],
    pub accent: [&'static str; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub accent: &'static str,
    pub gradient: Gradients,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub colors: Palette,
    pub is_dark: bool,
}

pub const LIGHT: Theme = Theme {
    colors: Palette {
        primary: "#667eea",
        secondary: "#764ba2",
        background: "#f8f9fa",
        surface: "#ffffff",
        card: "#ffffff",
        text: "#333333",
        text_secondary: "#666666",
        border: "#e9ecef",
        success: "#4ecdc4",
        warning: "#ffa726",
        error: "#ff6b6b",
        accent: "#a8edea",
        gradient: Gradients {
            primary: ["#667eea", "#764ba2", "#f093fb"],
            secondary: ["#a8edea", "#fed6e3", "#ffffff"],
            accent: ["#ff6b6b", "#ffa726", "#ffd54f"],
        },
    },
    is_dark: false,
};

pub const DARK: Theme = Theme {
    colors: Palette {
        primary: "#8b9aff",
        secondary: "#9d7cc7",
        background: "#0f0f0f",
        surface: "#1a1a1a",
        card: "#2a2a2a",
        text: "#ffffff",
        text_secondary: "#b0b0b0",
        border: "#3a3a3a",
        success: "#5ce1d8",
        warning: "#ffb74d",
        error: "#ff8a80",
        accent: "#b8f2ef",
        gradient: Gradients {
            primary: ["#8b9aff", "#9d7cc7", "#c39bd3"],
            secondary: ["#2a2a2a", "#3a3a3a", "#4a4a4a"],
            accent: ["#ff8a80", "#ffb74d", "#ffe082"],
        },
    },
    is_dark: true,
};

impl Theme {
    pub fn for_mode(is_dark: bool) -> &'static Theme {
        if is_dark { &DARK } else { &LIGHT }
    }
}

/// Parses `#rrggbb` into an RGB triple.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

type Listener = Box<dyn FnMut(&Theme)>;

/// Holds the active mode; writes go straight to storage and fan out to
/// subscribers.
pub struct ThemeProvider {
    is_dark: bool,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for ThemeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeProvider")
            .field("is_dark", &self.is_dark)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ThemeProvider {
    #[instrument(skip(storage))]
    pub fn load(storage: &LocalStorage) -> Self {
        let is_dark = storage.get_or(THEME_KEY, false);
        info!(is_dark, "loaded theme preference");
        Self {
            is_dark,
            listeners: Vec::new(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark
    }

    pub fn theme(&self) -> &'static Theme {
        Theme::for_mode(self.is_dark)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Theme) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    #[instrument(skip(self, storage))]
    pub fn set_dark(&mut self, storage: &mut LocalStorage, is_dark: bool) -> anyhow::Result<()> {
        self.is_dark = is_dark;
        storage.set(THEME_KEY, &is_dark)?;
        let theme = Theme::for_mode(is_dark);
        for listener in &mut self.listeners {
            listener(theme);
        }
        Ok(())
    }

    pub fn toggle(&mut self, storage: &mut LocalStorage) -> anyhow::Result<bool> {
        let next = !self.is_dark;
        self.set_dark(storage, next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tempfile::tempdir;

    use super::{DARK, LIGHT, ThemeProvider, hex_to_rgb};
    use crate::storage::{LocalStorage, THEME_KEY};

    #[test]
    fn defaults_to_light() {
        let storage = LocalStorage::in_memory();
        let provider = ThemeProvider::load(&storage);
        assert!(!provider.is_dark());
        assert_eq!(provider.theme(), &LIGHT);
    }

    #[test]
    fn dark_mode_survives_reload() {
        let temp = tempdir().expect("tempdir");
        {
            let mut storage = LocalStorage::open(temp.path()).expect("open");
            let mut provider = ThemeProvider::load(&storage);
            provider.set_dark(&mut storage, true).expect("set dark");
        }
        let storage = LocalStorage::open(temp.path()).expect("reopen");
        let provider = ThemeProvider::load(&storage);
        assert!(provider.is_dark());
        assert_eq!(provider.theme(), &DARK);
    }

    #[test]
    fn malformed_preference_is_light() {
        let mut storage = LocalStorage::in_memory();
        storage.set(THEME_KEY, &"dusk").expect("set");
        assert!(!ThemeProvider::load(&storage).is_dark());
    }

    #[test]
    fn toggle_notifies_subscribers() {
        let mut storage = LocalStorage::in_memory();
        let mut provider = ThemeProvider::load(&storage);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        provider.subscribe(move |theme| sink.borrow_mut().push(theme.is_dark));

        assert!(provider.toggle(&mut storage).expect("toggle"));
        assert!(!provider.toggle(&mut storage).expect("toggle back"));
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert_eq!(storage.get::<bool>(THEME_KEY), Some(false));
    }

    #[test]
    fn parses_palette_hex() {
        assert_eq!(hex_to_rgb(LIGHT.colors.primary), Some((0x66, 0x7e, 0xea)));
        assert_eq!(hex_to_rgb("667eea"), None);
    }
}
