use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::remote::DEFAULT_CSV_URL;
use crate::state::theme::Theme;

/// Which rendition of the quadrant is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Bubble chart with slider controls.
    Bubble,
    /// Draggable text labels on a drawing surface.
    Canvas,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Bubble => "Bubbles",
            ViewMode::Canvas => "Canvas",
        }
    }
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Bubble
    }
}

/// Preferences persisted between launches. Loading and saving are best
/// effort: a missing or unreadable file just means defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub csv_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            view_mode: ViewMode::default(),
            csv_url: DEFAULT_CSV_URL.to_string(),
        }
    }
}

impl AppConfig {
    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quadrant").join("config.json"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file {:?}: {e}", path);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {:?}: {e}", path);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create config directory {:?}: {e}", parent);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Failed to save config to {:?}: {e}", path);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize config: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_published_source() {
        let config = AppConfig::default();
        assert_eq!(config.csv_url, DEFAULT_CSV_URL);
        assert_eq!(config.view_mode, ViewMode::Bubble);
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut config = AppConfig::default();
        config.view_mode = ViewMode::Canvas;
        config.csv_url = "https://example.com/data.csv".to_string();

        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.view_mode, ViewMode::Canvas);
        assert_eq!(back.csv_url, config.csv_url);
    }

    #[test]
    fn unknown_or_missing_fields_fall_back_to_defaults() {
        let back: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(back.csv_url, DEFAULT_CSV_URL);
    }
}
