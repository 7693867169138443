use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::feed::build_feed_url;
use crate::geo::ObserverPoint;
use crate::status::{StatusProjector, StatusSettings, TrackSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid observer coordinates: {0:?}")]
    InvalidCoordinates(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
    pub web: WebConfig,
    pub status: StatusConfig,
    pub tracks: TracksConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObserverConfig {
    /// `"lat, lon"` in decimal degrees.
    #[serde(default)]
    pub coordinates: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url_template: String,
    pub radius_km: f64,
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url_template: "https://api.airplanes.live/v2/point/{lat}/{lon}/{radius}".to_string(),
            radius_km: 10.0,
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_folder: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            base_folder: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub query_timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: "0.0.0.0:8080".to_string(),
            query_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub lookback: Duration,
    pub ceiling_km: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            lookback: Duration::from_secs(30 * 60),
            ceiling_km: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracksConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub lookback: Duration,
    pub ceiling_km: f64,
    pub limit: usize,
}

impl Default for TracksConfig {
    fn default() -> Self {
        TracksConfig {
            lookback: Duration::from_secs(12 * 60 * 60),
            ceiling_km: 10.0,
            limit: 20,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

fn chrono_duration(key: &str, d: Duration) -> Result<chrono::Duration, ConfigError> {
    chrono::Duration::from_std(d).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn positive_km(key: &str, km: f64) -> Result<(), ConfigError> {
    if km.is_finite() && km > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be a positive distance, got {}", km),
        })
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Reads the file if given, then applies environment overrides. A `.env`
    /// file in the working directory is honoured.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Ignoring .env file: {}", e);
            }
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides values from `OBSERVER_LAT`/`OBSERVER_LON`, `FEED_RADIUS_KM`,
    /// `POLL_INTERVAL`, `STORAGE_PATH` and `PORT`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (lookup("OBSERVER_LAT"), lookup("OBSERVER_LON")) {
            (Some(lat), Some(lon)) => self.observer.coordinates = format!("{}, {}", lat, lon),
            (None, None) => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "OBSERVER_LAT/OBSERVER_LON".to_string(),
                    message: "both must be set".to_string(),
                })
            }
        }

        if let Some(radius) = lookup("FEED_RADIUS_KM") {
            self.feed.radius_km = radius.trim().parse().map_err(|e: std::num::ParseFloatError| {
                ConfigError::InvalidValue {
                    key: "FEED_RADIUS_KM".to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        if let Some(interval) = lookup("POLL_INTERVAL") {
            self.feed.poll_interval =
                humantime::parse_duration(interval.trim()).map_err(|e| ConfigError::InvalidValue {
                    key: "POLL_INTERVAL".to_string(),
                    message: e.to_string(),
                })?;
        }

        if let Some(path) = lookup("STORAGE_PATH") {
            self.storage.base_folder = PathBuf::from(path);
        }

        if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "PORT".to_string(),
                    message: e.to_string(),
                }
            })?;
            self.web.bind = format!("0.0.0.0:{}", port);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.observer_point()?;
        if self.feed.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "feed.poll_interval".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        positive_km("status.ceiling_km", self.status.ceiling_km)?;
        positive_km("tracks.ceiling_km", self.tracks.ceiling_km)?;
        positive_km("feed.radius_km", self.feed.radius_km)?;
        if self.tracks.limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tracks.limit".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        self.projector()?;
        Ok(())
    }

    pub fn observer_point(&self) -> Result<ObserverPoint, ConfigError> {
        ObserverPoint::from_coordinates(&self.observer.coordinates)
            .ok_or_else(|| ConfigError::InvalidCoordinates(self.observer.coordinates.clone()))
    }

    pub fn feed_url(&self) -> Result<String, ConfigError> {
        Ok(build_feed_url(
            &self.feed.url_template,
            &self.observer_point()?,
            self.feed.radius_km,
        ))
    }

    pub fn projector(&self) -> Result<StatusProjector, ConfigError> {
        Ok(StatusProjector::new(
            StatusSettings {
                lookback: chrono_duration("status.lookback", self.status.lookback)?,
                ceiling_km: self.status.ceiling_km,
            },
            TrackSettings {
                lookback: chrono_duration("tracks.lookback", self.tracks.lookback)?,
                ceiling_km: self.tracks.ceiling_km,
                limit: self.tracks.limit,
            },
        ))
    }
}
