//! Configuration: embedded defaults with a user override file.
//!
//! The embedded `config.toml` always parses; a user file at
//! `~/.config/cantata/config.toml` overrides individual fields. A
//! malformed user file is reported and ignored, never fatal.

use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    limits: LimitsConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    bpm: Option<f64>,
    time_signature: Option<[u8; 2]>,
}

#[derive(Deserialize, Default)]
struct LimitsConfig {
    history_depth: Option<usize>,
    engine_queue_capacity: Option<usize>,
}

pub struct Config {
    defaults: DefaultsConfig,
    limits: LimitsConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_defaults(&mut base.defaults, user.defaults);
                            merge_limits(&mut base.limits, user.limits);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            defaults: base.defaults,
            limits: base.limits,
        }
    }

    /// Default tempo for new projects (clamped to a sane range).
    pub fn default_bpm(&self) -> f64 {
        self.defaults
            .bpm
            .filter(|bpm| bpm.is_finite())
            .unwrap_or(120.0)
            .clamp(1.0, 999.0)
    }

    pub fn default_time_signature(&self) -> (u8, u8) {
        self.defaults
            .time_signature
            .map(|ts| (ts[0], ts[1]))
            .unwrap_or((4, 4))
    }

    /// Maximum number of undoable steps kept in history.
    pub fn history_depth(&self) -> usize {
        self.limits.history_depth.unwrap_or(100).max(1)
    }

    /// Capacity of the queue feeding the engine endpoint.
    pub fn engine_queue_capacity(&self) -> usize {
        self.limits.engine_queue_capacity.unwrap_or(256).max(1)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cantata").join("config.toml"))
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.bpm.is_some() {
        base.bpm = user.bpm;
    }
    if user.time_signature.is_some() {
        base.time_signature = user.time_signature;
    }
}

fn merge_limits(base: &mut LimitsConfig, user: LimitsConfig) {
    if user.history_depth.is_some() {
        base.history_depth = user.history_depth;
    }
    if user.engine_queue_capacity.is_some() {
        base.engine_queue_capacity = user.engine_queue_capacity;
    }
}
