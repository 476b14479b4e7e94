use std::io::Write;

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImpactStyle {
    Light,
    #[default]
    Medium,
    Heavy,
}

/// A device capability that can buzz.
pub trait HapticHost {
    fn impact(&mut self, style: ImpactStyle) -> anyhow::Result<()>;

    /// A short test sound. Hosts without a speaker reuse a light impact.
    fn chime(&mut self) -> anyhow::Result<()> {
        self.impact(ImpactStyle::Light)
    }
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct BellHaptics;

impl HapticHost for BellHaptics {
    fn impact(&mut self, style: ImpactStyle) -> anyhow::Result<()> {
        trace!(?style, "bell");
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoHaptics;

impl HapticHost for NoHaptics {
    fn impact(&mut self, _style: ImpactStyle) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Honors the vibration and sounds settings and swallows host failures.
pub struct Haptics {
    host: Box<dyn HapticHost>,
    enabled: bool,
    sounds: bool,
    fired: u32,
    chimed: u32,
}

impl std::fmt::Debug for Haptics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Haptics")
            .field("enabled", &self.enabled)
            .field("sounds", &self.sounds)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl Haptics {
    pub fn new(host: Box<dyn HapticHost>, enabled: bool) -> Self {
        Self {
            host,
            enabled,
            sounds: true,
            fired: 0,
            chimed: 0,
        }
    }

    pub fn with_sounds(mut self, sounds: bool) -> Self {
        self.sounds = sounds;
        self
    }

    pub fn none() -> Self {
        Self::new(Box::new(NoHaptics), false)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_sounds(&mut self, sounds: bool) {
        self.sounds = sounds;
    }

    /// Pulses delivered so far.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn chimed(&self) -> u32 {
        self.chimed
    }

    pub fn chime(&mut self) {
        if !self.sounds {
            return;
        }
        match self.host.chime() {
            Ok(()) => self.chimed += 1,
            Err(err) => debug!(error = %err, "sound not available"),
        }
    }

    pub fn pulse(&mut self) {
        self.impact(ImpactStyle::default());
    }

    pub fn impact(&mut self, style: ImpactStyle) {
        if !self.enabled {
            return;
        }
        match self.host.impact(style) {
            Ok(()) => self.fired += 1,
            Err(err) => debug!(error = %err, "haptics not available"),
        }
    }
}
