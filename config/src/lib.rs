use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use slippi_clipper_logging::Log;
use slippi_combo::{MeleeCharacter, PartialComboFilterSettings};
use slippi_dolphin_queue::QueueOptions;
use slippi_folder_stream::FolderStreamOptions;

pub const FOLDER_ENV: &str = "SLIPPI_CLIPPER_FOLDER";
pub const OUTPUT_ENV: &str = "SLIPPI_CLIPPER_OUTPUT";
pub const LOG_ENV: &str = "SLIPPI_CLIPPER_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A per-character minimum percent entry. TOML tables can't be keyed by number, so these
/// are written as an array of tables instead of a map.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct CharacterPercent {
    pub character: MeleeCharacter,
    pub percent: f32,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ComboSection {
    #[serde(flatten)]
    pub settings: PartialComboFilterSettings,

    #[serde(rename = "perCharacter")]
    pub per_character: Option<Vec<CharacterPercent>>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct StreamSection {
    pub folder: Option<PathBuf>,
    pub extension: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ClipperConfig {
    /// Where the playback queue is written.
    pub output_path: Option<PathBuf>,
    pub combo: ComboSection,
    pub queue: Option<QueueOptions>,
    pub stream: StreamSection,
    pub logging: LoggingSection,
}

impl ClipperConfig {
    /// Merges two configurations. Values in `other` take precedence.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_path: other.output_path.or(self.output_path),
            combo: ComboSection {
                settings: self.combo.settings.merge(other.combo.settings),
                per_character: other.combo.per_character.or(self.combo.per_character),
            },
            queue: other.queue.or(self.queue),
            stream: StreamSection {
                folder: other.stream.folder.or(self.stream.folder),
                extension: other.stream.extension.or(self.stream.extension),
                poll_interval_ms: other.stream.poll_interval_ms.or(self.stream.poll_interval_ms),
            },
            logging: LoggingSection {
                level: other.logging.level.or(self.logging.level),
            },
        }
    }

    /// Default configuration values are sourced from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the environment layer from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            output_path: lookup(OUTPUT_ENV).map(PathBuf::from),
            stream: StreamSection {
                folder: lookup(FOLDER_ENV).map(PathBuf::from),
                ..Default::default()
            },
            logging: LoggingSection { level: lookup(LOG_ENV) },
            ..Default::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads `path` and layers it over the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!(target: Log::Clipper, ?path, "Loading config");

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_env().merge(Self::from_toml_str(&contents)?))
    }

    /// Combo filter overrides, with any per-character entries folded in.
    pub fn filter_settings(&self) -> PartialComboFilterSettings {
        let mut settings = self.combo.settings.clone();

        if let Some(per_character) = &self.combo.per_character {
            let overrides: BTreeMap<MeleeCharacter, f32> = per_character
                .iter()
                .map(|entry| (entry.character, entry.percent))
                .collect();
            settings.per_character_min_combo_percent = Some(overrides);
        }

        settings
    }

    pub fn queue_options(&self) -> QueueOptions {
        self.queue.clone().unwrap_or_default()
    }

    pub fn stream_options(&self) -> FolderStreamOptions {
        let defaults = FolderStreamOptions::default();

        FolderStreamOptions {
            extension: self.stream.extension.clone().unwrap_or(defaults.extension),
            poll_interval: self
                .stream
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        self.logging
            .level
            .as_deref()
            .map(slippi_clipper_logging::parse_level)
            .unwrap_or(tracing::Level::INFO)
    }
}
