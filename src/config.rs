use std::{
    ops::Not,
    path::{Path, PathBuf},
};

use chrono::NaiveTime;
use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::sound::SoundKind;

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Not for Theme {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl From<Theme> for egui::Visuals {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }
}

/// the one persisted settings record. every field has a default so a partial
/// or missing config file still loads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub theme: Theme,
    /// daily window in which alarms may go off, wraps past midnight when
    /// start > end
    #[serde(with = "toml_datetime_compat", default = "default_window_start")]
    pub window_start: NaiveTime,
    #[serde(with = "toml_datetime_compat", default = "default_window_end")]
    pub window_end: NaiveTime,
    #[serde(default = "default_min_interval")]
    pub min_interval_minutes: u32,
    #[serde(default = "default_max_interval")]
    pub max_interval_minutes: u32,
    #[serde(default)]
    pub sound: SoundKind,
    /// 0 to 100
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_duration")]
    pub duration_seconds: u32,
}

fn default_window_start() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).expect("valid time")
}

fn default_window_end() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 0, 0).expect("valid time")
}

const fn default_min_interval() -> u32 {
    30
}

const fn default_max_interval() -> u32 {
    120
}

const fn default_volume() -> u8 {
    50
}

const fn default_duration() -> u32 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            window_start: default_window_start(),
            window_end: default_window_end(),
            min_interval_minutes: default_min_interval(),
            max_interval_minutes: default_max_interval(),
            sound: SoundKind::default(),
            volume: default_volume(),
            duration_seconds: default_duration(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// read and sanitize the config, falling back to defaults on any failure.
    /// a broken config file never stops the clock.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(error) => {
                log::warn!("couldn't read config {}: {error}", path.display());
                return Self::default();
            }
        };
        match toml::from_str::<Self>(&text) {
            Ok(config) => config.sanitized(),
            Err(error) => {
                log::warn!("couldn't parse config {}: {error}", path.display());
                Self::default()
            }
        }
    }

    /// write the config, logging instead of failing when the disk says no
    pub fn save(&self, path: &Path) {
        let text = match toml::to_string(self) {
            Ok(text) => text,
            Err(error) => {
                log::error!("couldn't serialize config: {error}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                log::error!("couldn't create config dir {}: {error}", parent.display());
                return;
            }
        }
        if let Err(error) = std::fs::write(path, text) {
            log::error!("couldn't write config {}: {error}", path.display());
        }
    }

    /// clamp anything a hand-edited file or a mid-edit ui could get wrong,
    /// so the scheduler only ever sees `1 <= min <= max` and a sane volume
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.min_interval_minutes = self.min_interval_minutes.max(1);
        self.max_interval_minutes = self.max_interval_minutes.max(self.min_interval_minutes);
        self.volume = self.volume.min(100);
        self.duration_seconds = self.duration_seconds.max(1);
        self
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        let mut path = directories::ProjectDirs::from("", "", "pesky_clock")?
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        Some(path)
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().is_some_and(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_documented_defaults() {
        let config: Config = toml::from_str("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.window_start, default_window_start());
        assert_eq!(config.window_end, default_window_end());
        assert_eq!(config.min_interval_minutes, 30);
        assert_eq!(config.max_interval_minutes, 120);
        assert_eq!(config.sound, SoundKind::Dialup);
        assert_eq!(config.volume, 50);
        assert_eq!(config.duration_seconds, 10);
    }

    #[test]
    fn partial_config_keeps_given_keys() {
        let config: Config = toml::from_str(
            "min_interval_minutes = 5\nmax_interval_minutes = 15\nsound = \"static\"\n",
        )
        .expect("partial config parses");
        assert_eq!(config.min_interval_minutes, 5);
        assert_eq!(config.max_interval_minutes, 15);
        assert_eq!(config.sound, SoundKind::Static);
        assert_eq!(config.volume, 50);
    }

    #[test]
    fn sanitize_repairs_broken_values() {
        let config = Config {
            min_interval_minutes: 0,
            max_interval_minutes: 0,
            volume: 200,
            duration_seconds: 0,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.min_interval_minutes, 1);
        assert_eq!(config.max_interval_minutes, 1);
        assert_eq!(config.volume, 100);
        assert_eq!(config.duration_seconds, 1);
    }

    #[test]
    fn sanitize_never_leaves_min_above_max() {
        let config = Config {
            min_interval_minutes: 90,
            max_interval_minutes: 10,
            ..Config::default()
        }
        .sanitized();
        assert!(config.min_interval_minutes <= config.max_interval_minutes);
        assert_eq!(config.max_interval_minutes, 90);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            theme: Theme::Light,
            window_start: NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
            window_end: NaiveTime::from_hms_opt(18, 45, 0).expect("valid time"),
            min_interval_minutes: 7,
            max_interval_minutes: 42,
            sound: SoundKind::Whine,
            volume: 85,
            duration_seconds: 25,
        };
        config.save(&path);
        assert_eq!(Config::load(&path), config);
    }

    #[test]
    fn unreadable_or_garbage_config_degrades_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.toml");
        assert_eq!(Config::load(&missing), Config::default());

        let garbage = dir.path().join("garbage.toml");
        std::fs::write(&garbage, "window_start = \"not a time\"").expect("write");
        assert_eq!(Config::load(&garbage), Config::default());
    }
}
