//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::dataset::DatasetSource;
use crate::error::PhotomapError;
use crate::gallery::GalleryOptions;
use crate::geo::GeoPoint;
use crate::progress::DEFAULT_STORAGE_KEY;

/// Environment variable with the path of a JSON configuration file.
pub const CONFIG_ENV: &str = "PHOTOMAP_CONFIG";
/// Environment variable overriding the dataset source.
pub const DATA_ENV: &str = "PHOTOMAP_DATA";

const MAX_ZOOM: f64 = 20.0;

/// Which part of the application is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// All locations on the map.
    #[default]
    Gallery,
    /// Guessing game.
    Quiz,
}

/// Configuration of the application.
///
/// Every field is optional in the JSON form, missing fields take the default values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    data_source: String,
    storage_dir: PathBuf,
    storage_key: String,
    fly_to_zoom: f64,
    fly_to_duration_ms: u64,
    pick_cooldown_ms: u64,
    initial_center: [f64; 2],
    initial_zoom: f64,
    seed: Option<u64>,
    start_mode: AppMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_source: "data.csv".into(),
            storage_dir: ".photomap".into(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            fly_to_zoom: 9.0,
            fly_to_duration_ms: 3000,
            pick_cooldown_ms: 3000,
            initial_center: [20.0, 0.0],
            initial_zoom: 2.0,
            seed: None,
            start_mode: AppMode::Gallery,
        }
    }
}

impl AppConfig {
    /// Reads the configuration file named by [`CONFIG_ENV`] (if set) and applies the
    /// [`DATA_ENV`] override.
    pub fn from_env() -> Result<Self, PhotomapError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        if let Ok(source) = std::env::var(DATA_ENV) {
            config = config.with_data_source(source);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PhotomapError> {
        info!("Reading configuration from {:?}", path.as_ref());
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses the configuration from a JSON document.
    pub fn from_json(text: &str) -> Result<Self, PhotomapError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PhotomapError> {
        if self.data_source.trim().is_empty() {
            return Err(PhotomapError::Config("data source is empty".into()));
        }
        if self.storage_key.is_empty() {
            return Err(PhotomapError::Config("storage key is empty".into()));
        }
        if !(0.0..=MAX_ZOOM).contains(&self.fly_to_zoom)
            || !(0.0..=MAX_ZOOM).contains(&self.initial_zoom)
        {
            return Err(PhotomapError::Config(format!(
                "zoom levels must be in [0, {MAX_ZOOM}]"
            )));
        }
        let [lat, lon] = self.initial_center;
        if !(-90.0..=90.0).contains(&lat) || !lon.is_finite() {
            return Err(PhotomapError::Config(format!(
                "invalid initial center [{lat}, {lon}]"
            )));
        }

        Ok(())
    }

    /// Where the location table is loaded from.
    pub fn data_source(&self) -> DatasetSource {
        DatasetSource::parse(&self.data_source)
    }

    /// Sets the location table source (a file path or an http(s) url).
    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = source.into();
        self
    }

    /// Folder the game progress is stored in.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Sets the folder the game progress is stored in.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Namespace key of the stored game progress.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Seed to shuffle a new game with. A random seed is used if not set.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Pins the seed a new game is shuffled with.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Map center on start-up.
    pub fn initial_center(&self) -> GeoPoint {
        GeoPoint::latlon(self.initial_center[0], self.initial_center[1])
    }

    /// Zoom level on start-up.
    pub fn initial_zoom(&self) -> f64 {
        self.initial_zoom
    }

    /// Mode shown on start-up.
    pub fn start_mode(&self) -> AppMode {
        self.start_mode
    }

    /// Sets the mode shown on start-up.
    pub fn with_start_mode(mut self, mode: AppMode) -> Self {
        self.start_mode = mode;
        self
    }

    /// Parameters of the gallery "random location" flight.
    pub fn gallery_options(&self) -> GalleryOptions {
        GalleryOptions::default()
            .with_fly_to_zoom(self.fly_to_zoom)
            .with_fly_to_duration(Duration::from_millis(self.fly_to_duration_ms))
            .with_cooldown(Duration::from_millis(self.pick_cooldown_ms))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_json("{}").expect("failed to parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data_source(), DatasetSource::File("data.csv".into()));
        assert_eq!(config.storage_key(), "screensaver-geoguess");
        assert_eq!(config.initial_center(), GeoPoint::latlon(20.0, 0.0));
        assert_eq!(config.start_mode(), AppMode::Gallery);
    }

    #[test]
    fn parses_fields() {
        let config = AppConfig::from_json(
            r#"{
                "data_source": "https://example.com/data.csv",
                "fly_to_zoom": 7.5,
                "pick_cooldown_ms": 500,
                "seed": 17,
                "start_mode": "quiz"
            }"#,
        )
        .expect("failed to parse");

        assert_matches!(config.data_source(), DatasetSource::Url(_));
        assert_eq!(config.seed(), Some(17));
        assert_eq!(config.start_mode(), AppMode::Quiz);

        let options = config.gallery_options();
        assert_eq!(options.fly_to_zoom(), 7.5);
        assert_eq!(options.cooldown(), Duration::from_millis(500));
        assert_eq!(options.fly_to_duration(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_matches!(
            AppConfig::from_json(r#"{"data_source": " "}"#),
            Err(PhotomapError::Config(_))
        );
        assert_matches!(
            AppConfig::from_json(r#"{"fly_to_zoom": 42}"#),
            Err(PhotomapError::Config(_))
        );
        assert_matches!(
            AppConfig::from_json(r#"{"initial_center": [95, 0]}"#),
            Err(PhotomapError::Config(_))
        );
        assert_matches!(
            AppConfig::from_json(r#"{"seed": "abc"}"#),
            Err(PhotomapError::Json(_))
        );
    }

    #[test]
    fn builder_setters() {
        let config = AppConfig::default()
            .with_data_source("other.csv")
            .with_storage_dir("/tmp/photomap")
            .with_seed(3)
            .with_start_mode(AppMode::Quiz);

        assert_eq!(config.data_source(), DatasetSource::File("other.csv".into()));
        assert_eq!(config.storage_dir(), Path::new("/tmp/photomap"));
        assert_eq!(config.seed(), Some(3));
        assert_eq!(config.start_mode(), AppMode::Quiz);
    }
}
