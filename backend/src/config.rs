//! Configuration file and environment handling.
//!
//! Settings are read from a TOML file (every field optional) and then
//! overridden from the environment. The analytics section is validated into a
//! typed [`AnalyticsConfig`] that is passed explicitly to every engine call.

use chrono::Duration;
use chrono_tz::Tz;
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::RepositoryType;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{NaiveTimestampPolicy, OpeningHours};

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ATTENDANCE_CONFIG";

/// Upper bound on the lookback window, roughly a thousand years.
pub const MAX_LOOKBACK_WEEKS: u32 = 52_000;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default)]
    pub repo_type: RepositoryType,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Raw analytics settings as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    #[serde(default = "default_granularity_minutes")]
    pub granularity_minutes: u32,
    #[serde(default = "default_opening_time")]
    pub opening_time: String,
    #[serde(default = "default_closing_time")]
    pub closing_time: String,
    #[serde(default = "default_coarse_step_minutes")]
    pub coarse_step_minutes: u32,
    #[serde(default = "default_lookback_weeks")]
    pub lookback_weeks: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub naive_timestamps: NaiveTimestampPolicy,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_path() -> PathBuf {
    PathBuf::from("attendance/attendance_data.jsonl")
}

fn default_granularity_minutes() -> u32 {
    10
}

fn default_opening_time() -> String {
    "06:00".to_string()
}

fn default_closing_time() -> String {
    "22:00".to_string()
}

fn default_coarse_step_minutes() -> u32 {
    60
}

fn default_lookback_weeks() -> u32 {
    4
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: RepositoryType::Jsonl,
            path: Some(default_data_path()),
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            granularity_minutes: default_granularity_minutes(),
            opening_time: default_opening_time(),
            closing_time: default_closing_time(),
            coarse_step_minutes: default_coarse_step_minutes(),
            lookback_weeks: default_lookback_weeks(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timezone: default_timezone(),
            naive_timestamps: NaiveTimestampPolicy::default(),
        }
    }
}

/// Validated engine parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Fine bucket width; divides one hour.
    pub granularity_minutes: u32,
    /// Summary-table bucket width.
    pub coarse_step_minutes: u32,
    pub opening_hours: OpeningHours,
    /// Trailing window for "typical" curves, the summary table and peaks.
    pub lookback: Duration,
    pub cache_ttl: Duration,
    /// Reference zone every timestamp is converted to.
    pub timezone: Tz,
    pub naive_timestamps: NaiveTimestampPolicy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: default_granularity_minutes(),
            coarse_step_minutes: default_coarse_step_minutes(),
            opening_hours: OpeningHours::default(),
            lookback: Duration::weeks(i64::from(default_lookback_weeks())),
            cache_ttl: Duration::seconds(default_cache_ttl_secs() as i64),
            timezone: chrono_tz::Europe::Zurich,
            naive_timestamps: NaiveTimestampPolicy::default(),
        }
    }
}

impl AnalyticsSettings {
    /// Validate the raw settings and produce an [`AnalyticsConfig`].
    pub fn to_config(&self) -> AnalyticsResult<AnalyticsConfig> {
        if self.granularity_minutes == 0 || 60 % self.granularity_minutes != 0 {
            return Err(AnalyticsError::configuration(format!(
                "granularity_minutes must divide 60, got {}",
                self.granularity_minutes
            )));
        }
        if self.coarse_step_minutes == 0 || self.coarse_step_minutes > 24 * 60 {
            return Err(AnalyticsError::configuration(format!(
                "coarse_step_minutes must be within 1..=1440, got {}",
                self.coarse_step_minutes
            )));
        }
        if self.lookback_weeks == 0 || self.lookback_weeks > MAX_LOOKBACK_WEEKS {
            return Err(AnalyticsError::configuration(format!(
                "lookback_weeks must be within 1..={}, got {}",
                MAX_LOOKBACK_WEEKS, self.lookback_weeks
            )));
        }
        let lookback = Duration::try_weeks(i64::from(self.lookback_weeks)).ok_or_else(|| {
            AnalyticsError::configuration(format!(
                "lookback_weeks out of range: {}",
                self.lookback_weeks
            ))
        })?;
        let cache_ttl = i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AnalyticsError::configuration(format!(
                    "cache_ttl_secs out of range: {}",
                    self.cache_ttl_secs
                ))
            })?;

        let opening_hours = OpeningHours::parse(&self.opening_time, &self.closing_time)
            .map_err(AnalyticsError::configuration)?;
        let timezone: Tz = self.timezone.parse().map_err(|_| {
            AnalyticsError::configuration(format!("unknown timezone '{}'", self.timezone))
        })?;

        Ok(AnalyticsConfig {
            granularity_minutes: self.granularity_minutes,
            coarse_step_minutes: self.coarse_step_minutes,
            opening_hours,
            lookback,
            cache_ttl,
            timezone,
            naive_timestamps: self.naive_timestamps,
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalyticsResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AnalyticsError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AnalyticsResult<Self> {
        toml::from_str(content).map_err(|e| {
            AnalyticsError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Uses `ATTENDANCE_CONFIG` when set, otherwise searches for
    /// `attendance.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Falls back to built-in defaults when no file exists.
    pub fn from_default_location() -> AnalyticsResult<Self> {
        if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
            return Self::from_file(explicit);
        }

        let search_paths = [
            PathBuf::from("attendance.toml"),
            PathBuf::from("backend/attendance.toml"),
            PathBuf::from("../attendance.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        info!("No attendance.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Apply environment overrides on top of file settings.
    ///
    /// # Environment Variables
    /// - `HOST`: Server host
    /// - `PORT`: Server port
    /// - `ATTENDANCE_DATA_PATH`: JSONL log path (switches the source to `jsonl`)
    /// - `ATTENDANCE_TIMEZONE`: Reference IANA zone
    /// - `ATTENDANCE_CACHE_TTL_SECS`: Result cache TTL
    pub fn apply_env_overrides(&mut self) -> AnalyticsResult<()> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().map_err(|_| {
                AnalyticsError::configuration(format!("PORT must be a valid port number, got '{}'", port))
            })?;
        }
        if let Ok(path) = env::var("ATTENDANCE_DATA_PATH") {
            self.repository.repo_type = RepositoryType::Jsonl;
            self.repository.path = Some(PathBuf::from(path));
        }
        if let Ok(tz) = env::var("ATTENDANCE_TIMEZONE") {
            self.analytics.timezone = tz;
        }
        if let Ok(ttl) = env::var("ATTENDANCE_CACHE_TTL_SECS") {
            self.analytics.cache_ttl_secs = ttl.parse().map_err(|_| {
                AnalyticsError::configuration(format!(
                    "ATTENDANCE_CACHE_TTL_SECS must be a whole number of seconds, got '{}'",
                    ttl
                ))
            })?;
        }
        Ok(())
    }

    /// File (or defaults) plus environment overrides.
    pub fn load() -> AnalyticsResult<Self> {
        let mut config = Self::from_default_location()?;
        config.apply_env_overrides()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.repository.repo_type, RepositoryType::Jsonl);
        let analytics = config.analytics.to_config().unwrap();
        assert_eq!(analytics, AnalyticsConfig::default());
        assert_eq!(analytics.lookback, Duration::weeks(4));
        assert_eq!(analytics.cache_ttl, Duration::seconds(300));
    }

    #[test]
    fn test_parse_partial_file() {
        let toml = r#"
[repository]
type = "local"

[analytics]
granularity_minutes = 15
timezone = "Europe/Berlin"
naive_timestamps = "reject"
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, RepositoryType::Local);
        assert_eq!(config.server.host, "0.0.0.0");
        let analytics = config.analytics.to_config().unwrap();
        assert_eq!(analytics.granularity_minutes, 15);
        assert_eq!(analytics.coarse_step_minutes, 60);
        assert_eq!(analytics.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(analytics.naive_timestamps, NaiveTimestampPolicy::Reject);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.analytics.lookback_weeks, 4);
        assert_eq!(
            config.repository.path.as_deref(),
            Some(Path::new("attendance/attendance_data.jsonl"))
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[analytics\n").unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_granularity_not_dividing_hour() {
        let settings = AnalyticsSettings {
            granularity_minutes: 7,
            ..Default::default()
        };
        assert!(settings.to_config().is_err());

        let zero = AnalyticsSettings {
            granularity_minutes: 0,
            ..Default::default()
        };
        assert!(zero.to_config().is_err());
    }

    #[test]
    fn test_rejects_bad_opening_hours_and_zone() {
        let reversed = AnalyticsSettings {
            opening_time: "22:00".into(),
            closing_time: "06:00".into(),
            ..Default::default()
        };
        assert!(reversed.to_config().is_err());

        let zone = AnalyticsSettings {
            timezone: "Mars/Olympus_Mons".into(),
            ..Default::default()
        };
        let err = zone.to_config().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_rejects_zero_lookback_and_step() {
        let lookback = AnalyticsSettings {
            lookback_weeks: 0,
            ..Default::default()
        };
        assert!(lookback.to_config().is_err());

        let step = AnalyticsSettings {
            coarse_step_minutes: 0,
            ..Default::default()
        };
        assert!(step.to_config().is_err());
    }

    #[test]
    fn test_rejects_lookback_beyond_bound() {
        let huge = AnalyticsSettings {
            lookback_weeks: 20_000_000,
            ..Default::default()
        };
        let err = huge.to_config().unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
        assert!(err.to_string().contains("lookback_weeks"));

        let widest = AnalyticsSettings {
            lookback_weeks: MAX_LOOKBACK_WEEKS,
            ..Default::default()
        };
        let config = widest.to_config().unwrap();
        assert_eq!(config.lookback, Duration::weeks(i64::from(MAX_LOOKBACK_WEEKS)));
    }

    #[test]
    fn test_rejects_cache_ttl_out_of_range() {
        for secs in [10_000_000_000_000_000u64, u64::MAX] {
            let settings = AnalyticsSettings {
                cache_ttl_secs: secs,
                ..Default::default()
            };
            let err = settings.to_config().unwrap_err();
            assert!(matches!(err, AnalyticsError::Configuration { .. }));
            assert!(err.to_string().contains("cache_ttl_secs"));
        }
    }
}
