use heatwalk_core::Profile;
use owo_colors::OwoColorize;

use crate::ui::Style;

/// Color helper with a single policy shared across commands.
///
/// All functions return `String`; colors apply only when `style.color` is set.
pub struct Colors {
    pub enabled: bool,
}

impl Colors {
    pub fn new(style: &Style) -> Self {
        Self {
            enabled: style.color,
        }
    }

    #[inline]
    pub fn ok(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn err(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn warn(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.yellow().to_string()
        } else {
            s.to_string()
        }
    }

    #[inline]
    pub fn dim(&self, s: impl AsRef<str>) -> String {
        let s = s.as_ref();
        if self.enabled {
            s.bright_black().to_string()
        } else {
            s.to_string()
        }
    }

    /// Profile label in the profile's map color.
    pub fn profile(&self, profile: Profile) -> String {
        let s = profile.label();
        if !self.enabled {
            return s.to_string();
        }
        match profile {
            // fastest = red, balanced = amber, coolest = blue
            Profile::Fast => s.red().to_string(),
            Profile::Balanced => s.yellow().to_string(),
            Profile::Cool => s.blue().to_string(),
        }
    }

    /// Off-route distance: green on route, yellow drifting, red past `threshold_m`.
    pub fn off_route(&self, off_m: f64, threshold_m: f64, txt: impl AsRef<str>) -> String {
        let s = txt.as_ref();
        if !self.enabled {
            return s.to_string();
        }
        if off_m <= threshold_m / 2.0 {
            s.green().to_string()
        } else if off_m <= threshold_m {
            s.yellow().to_string()
        } else {
            s.red().to_string()
        }
    }
}
