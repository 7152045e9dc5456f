//! Settings management

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use weave_core::spell::catalog::{FIREBALL, FROST_NOVA, HEAL_SELF, HERO, VILLAIN};
use weave_core::time::DEFAULT_TICK_INTERVAL;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("simulation.tick_interval must be positive and finite, got {0}")]
    InvalidTickInterval(f32),

    #[error("simulation.frame_delta must be non-negative and finite, got {0}")]
    InvalidFrameDelta(f32),
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub paths: PathSettings,
    /// Casts issued by the runtime, in frame order.
    pub casts: Vec<ScriptedCast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Seconds between tick passes.
    pub tick_interval: f32,
    /// Host frame delta in seconds.
    pub frame_delta: f32,
    /// Number of frames the runtime simulates.
    pub frames: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub definitions: PathBuf,
    pub actors: PathBuf,
    pub actor_snapshot: PathBuf,
}

/// A cast issued at the start of a given frame, by actor name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCast {
    #[serde(default)]
    pub frame: u32,
    pub spell: String,
    pub caster: String,
    pub target: String,
}

impl ScriptedCast {
    fn new(frame: u32, spell: &str, caster: &str, target: &str) -> Self {
        Self {
            frame,
            spell: spell.to_owned(),
            caster: caster.to_owned(),
            target: target.to_owned(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            frame_delta: 1.0 / 60.0,
            frames: 120,
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            definitions: PathBuf::from("data/definitions.json"),
            actors: PathBuf::from("data/actors.json"),
            actor_snapshot: PathBuf::from("data/actors.snapshot.json"),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one
    /// is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::with_default_casts());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Defaults plus a short Hero versus Villain script.
    pub fn with_default_casts() -> Self {
        Self {
            casts: vec![
                ScriptedCast::new(0, FIREBALL, HERO, VILLAIN),
                ScriptedCast::new(30, HEAL_SELF, VILLAIN, HERO),
                ScriptedCast::new(60, FROST_NOVA, HERO, VILLAIN),
            ],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let sim = &self.simulation;
        if !(sim.tick_interval.is_finite() && sim.tick_interval > 0.0) {
            return Err(SettingsError::InvalidTickInterval(sim.tick_interval));
        }
        if !(sim.frame_delta.is_finite() && sim.frame_delta >= 0.0) {
            return Err(SettingsError::InvalidFrameDelta(sim.frame_delta));
        }
        Ok(())
    }
}
