use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use serde::Deserialize;

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Backdrop";
const APPLICATION: &str = "backdrop";
pub const CONFIG_FILE_NAME: &str = "backdrop.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// On-disk configuration; every key is optional.
///
/// ```toml
/// [window]
/// size = "1920x1080"
/// fullscreen = true
/// title = "Backdrop"
///
/// [render]
/// antialias = "4"
/// color_space = "auto"
/// power = "low"
/// still_time = 12.5
///
/// [headless]
/// frames = 240
/// step = 0.0166
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub headless: HeadlessSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSection {
    pub size: Option<String>,
    pub fullscreen: Option<bool>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    /// Same vocabulary as `--antialias`.
    pub antialias: Option<String>,
    /// Same vocabulary as `--color-space`.
    pub color_space: Option<String>,
    /// Same vocabulary as `--power`.
    pub power: Option<String>,
    pub still_time: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadlessSection {
    pub frames: Option<u32>,
    /// Simulated seconds between frames.
    pub step: Option<f32>,
}

impl FileConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates `path`; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Like [`FileConfig::load`], but a missing file yields `None`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(time) = self.render.still_time {
            if !time.is_finite() || time < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "render.still_time must be a non-negative number, got {time}"
                )));
            }
        }
        if let Some(step) = self.headless.step {
            if !step.is_finite() || step < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "headless.step must be a non-negative number, got {step}"
                )));
            }
        }
        if let Some(title) = &self.window.title {
            if title.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "window.title must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// `<config dir>/backdrop/backdrop.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
