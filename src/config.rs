// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::SourceKind;
use crate::paths::DateNamingScheme;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use strum::EnumIter;

fn default_true() -> bool {
    true
}

fn default_popup_delay() -> u64 {
    30
}

fn default_popup_duration() -> u64 {
    8
}

/// Which surfaces the reminder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStyle {
    #[default]
    Both,
    Notice,
    Modal,
}

impl ReminderStyle {
    pub fn shows_notice(&self) -> bool {
        matches!(self, ReminderStyle::Both | ReminderStyle::Notice)
    }

    pub fn shows_modal(&self) -> bool {
        matches!(self, ReminderStyle::Both | ReminderStyle::Modal)
    }
}

impl fmt::Display for ReminderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderStyle::Both => write!(f, "Notice and list"),
            ReminderStyle::Notice => write!(f, "Notice only"),
            ReminderStyle::Modal => write!(f, "List only"),
        }
    }
}

/// Per-source enable flags.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SourceToggles {
    #[serde(default = "default_true")]
    pub daily: bool,
    #[serde(default = "default_true")]
    pub project_calendar: bool,
    #[serde(default = "default_true")]
    pub holiday: bool,
    #[serde(default = "default_true")]
    pub recurring: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            daily: true,
            project_calendar: true,
            holiday: true,
            recurring: true,
        }
    }
}

impl SourceToggles {
    pub fn is_enabled(&self, source: SourceKind) -> bool {
        match source {
            SourceKind::Daily => self.daily,
            SourceKind::ProjectCalendar => self.project_calendar,
            SourceKind::Holiday => self.holiday,
            SourceKind::Recurring => self.recurring,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_popup_delay")]
    pub popup_delay_secs: u64,
    #[serde(default = "default_popup_duration")]
    pub popup_duration_secs: u64,
    #[serde(default)]
    pub reminder_style: ReminderStyle,
    #[serde(default = "default_true")]
    pub show_status_bar: bool,

    #[serde(default)]
    pub daily_note_path: String,
    #[serde(default)]
    pub project_calendar_path: String,
    #[serde(default)]
    pub recurring_config_path: String,
    #[serde(default)]
    pub daily_note_template_path: String,

    #[serde(default)]
    pub allow_move_to_past: bool,

    /// `YYYY-MM-DD` of the last automatic reminder that found something.
    #[serde(default)]
    pub last_reminder_date: String,

    /// Vault used by the command-line front-end when `--vault` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_path: Option<PathBuf>,

    #[serde(default)]
    pub sources: SourceToggles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            popup_delay_secs: 30,
            popup_duration_secs: 8,
            reminder_style: ReminderStyle::default(),
            show_status_bar: true,
            daily_note_path: String::new(),
            project_calendar_path: String::new(),
            recurring_config_path: String::new(),
            daily_note_template_path: String::new(),
            allow_move_to_past: false,
            last_reminder_date: String::new(),
            vault_path: None,
            sources: SourceToggles::default(),
        }
    }
}

impl Config {
    pub fn is_daily_configured(&self) -> bool {
        DateNamingScheme::is_configured(&self.daily_note_path)
    }

    pub fn popup_delay(&self) -> Duration {
        Duration::from_secs(self.popup_delay_secs)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.popup_duration_secs)
    }

    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        // Explicitly detect missing file so callers can fall back to defaults.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        // Walk the error chain and look for an underlying IO NotFound.
        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Get the path string using an explicit context.
    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: Config = toml::from_str(
            "daily_note_path = \"Daily\"\n[sources]\nholiday = false\n",
        )
        .unwrap();
        assert_eq!(cfg.daily_note_path, "Daily");
        assert!(!cfg.sources.holiday);
        assert!(cfg.sources.daily);
        assert_eq!(cfg.popup_delay_secs, 30);
        assert_eq!(cfg.reminder_style, ReminderStyle::Both);
    }

    #[test]
    fn save_and_load_roundtrip_through_context() {
        let ctx = TestContext::new();
        assert!(Config::load(&ctx).is_err());
        assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());

        let cfg = Config {
            daily_note_path: "00 - Daily Plan".to_string(),
            last_reminder_date: "2026-10-15".to_string(),
            reminder_style: ReminderStyle::Modal,
            ..Config::default()
        };
        cfg.save(&ctx).unwrap();
        assert_eq!(Config::load(&ctx).unwrap(), cfg);
    }
}
