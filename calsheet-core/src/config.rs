//! Configuration for reconciliation passes.
//!
//! [`SyncConfig`] is what the drivers consume. [`AppConfig`] is the file at
//! `~/.config/calsheet/config.toml` that wraps it together with the location
//! of the stores.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{SyncError, SyncResult};
use crate::field_map::{FieldKey, FieldLabels};
use crate::remote::Remote;
use crate::throttle::ThrottlePolicy;

static DEFAULT_SHEET_PATH: &str = "~/calsheet/sheet.json";

const DEFAULT_WINDOW_FUTURE_DAYS: i64 = 4 * 365;

/// When deleting calendar events that have no row requires confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionPolicy {
    /// Ask only when there are more deletions than updates in the pass.
    #[default]
    ConfirmUnlessChurn,
    AlwaysConfirm,
    NeverConfirm,
}

impl DeletionPolicy {
    pub fn needs_confirmation(&self, candidates: usize, updates: usize) -> bool {
        match self {
            DeletionPolicy::ConfirmUnlessChurn => candidates > updates,
            DeletionPolicy::AlwaysConfirm => true,
            DeletionPolicy::NeverConfirm => false,
        }
    }
}

/// How a changed row is written to the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateStrategy {
    /// Update in place when the store supports it, otherwise recreate.
    #[default]
    Auto,
    /// Always delete the event and create a new one.
    Recreate,
}

/// Everything a pull or push pass needs to know besides its stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Time zone table date-times are expressed in.
    pub timezone: Tz,
    /// Whether guests get invitations when events are created.
    pub send_invites: bool,
    pub labels: FieldLabels,
    pub required_fields: Vec<FieldKey>,
    pub throttle: ThrottlePolicy,
    pub deletion_policy: DeletionPolicy,
    pub update_strategy: UpdateStrategy,
    /// Number format applied to the time columns of a new table.
    pub datetime_format: String,
    /// Days of history a pass reads. Unset reads all history.
    pub window_past_days: Option<i64>,
    pub window_future_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            timezone: Tz::UTC,
            send_invites: false,
            labels: FieldLabels::default(),
            required_fields: FieldKey::REQUIRED.to_vec(),
            throttle: ThrottlePolicy::default(),
            deletion_policy: DeletionPolicy::default(),
            update_strategy: UpdateStrategy::default(),
            datetime_format: "M/d/yyyy H:mm".to_string(),
            window_past_days: None,
            window_future_days: DEFAULT_WINDOW_FUTURE_DAYS,
        }
    }
}

impl SyncConfig {
    pub fn window(&self) -> SyncResult<DateRange> {
        DateRange::around_now(self.window_past_days, self.window_future_days)
    }
}

fn default_sheet_path() -> PathBuf {
    PathBuf::from(DEFAULT_SHEET_PATH)
}

/// Configuration at ~/.config/calsheet/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The sheet file mirrored against the calendar.
    #[serde(default = "default_sheet_path")]
    pub sheet: PathBuf,

    pub remote: Option<Remote>,

    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Configuration("Could not determine config directory".into()))?
            .join("calsheet");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or the default location, creating a commented
    /// default file there on first run. `CALSHEET_*` variables override it.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                }
                p
            }
        };

        if !config_path.exists() {
            return Err(SyncError::Configuration(format!(
                "Config file not found at {}",
                config_path.display()
            )));
        }

        Config::builder()
            .add_source(File::from(config_path.as_path()))
            .add_source(Environment::with_prefix("CALSHEET").separator("__"))
            .build()
            .map_err(|e| SyncError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Configuration(e.to_string()))
    }

    /// The sheet path with `~` expanded.
    pub fn sheet_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.sheet.to_string_lossy()).into_owned())
    }

    /// The configured remote, or a configuration error naming what is missing.
    pub fn remote(&self) -> SyncResult<&Remote> {
        self.remote.as_ref().ok_or_else(|| {
            SyncError::Configuration(
                "No calendar configured. Add a [remote] section with a provider to config.toml"
                    .into(),
            )
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# calsheet configuration

# The sheet mirrored against your calendar:
# sheet = \"{}\"

# The calendar, reached through a calsheet-provider-<name> executable.
# Every other key is passed to the provider as is:
# [remote]
# provider = \"google\"
# google_calendar_id = \"primary\"

# [sync]
# timezone = \"Europe/Berlin\"
# send_invites = false
# required_fields = [\"id\", \"title\", \"starttime\"]
# deletion_policy = \"confirm-unless-churn\"  # or always-confirm, never-confirm
# update_strategy = \"auto\"                  # or recreate
# window_future_days = {}

# [sync.labels]
# title = \"Title\"
# starttime = \"Start Time\"

# [sync.throttle]
# burst = 10
# delay_ms = 75
",
            DEFAULT_SHEET_PATH, DEFAULT_WINDOW_FUTURE_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Configuration(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Configuration(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
