use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::data::weather::{DEFAULT_MAX_FORECAST_DAYS, DEFAULT_WEATHER_API_URL};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    pub weather: WeatherConfig,
    pub holidays: HolidayConfig,

    // Fixed "today" for the forecast window (set programmatically, not from env vars)
    #[serde(skip)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    /// Training-time `base_score`; the tree dump does not carry it
    pub model_base_score: f64,
    pub model_columns_path: PathBuf,
    pub menu_data_path: PathBuf,
    pub holidays_path: PathBuf,
    pub weather_api_key_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_url: String,
    pub location: String,
    pub max_forecast_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayConfig {
    pub country: String,
    pub region: Option<String>,
}

impl Config {
    /// Returns the effective date for the forecast window.
    /// Uses `reference_date` when set, otherwise the local calendar date.
    pub fn get_effective_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| defaults.server.port.to_string())
                    .parse()
                    .context("Invalid SERVER_PORT value")?,
            },
            artifacts: ArtifactConfig {
                model_path: env::var("MODEL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.model_path),
                model_base_score: env::var("MODEL_BASE_SCORE")
                    .unwrap_or_else(|_| defaults.artifacts.model_base_score.to_string())
                    .parse()
                    .context("Invalid MODEL_BASE_SCORE value")?,
                model_columns_path: env::var("MODEL_COLUMNS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.model_columns_path),
                menu_data_path: env::var("MENU_DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.menu_data_path),
                holidays_path: env::var("HOLIDAYS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.holidays_path),
                weather_api_key_path: env::var("WEATHER_API_KEY_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.weather_api_key_path),
            },
            weather: WeatherConfig {
                api_url: env::var("WEATHER_API_URL").unwrap_or(defaults.weather.api_url),
                location: env::var("RESTAURANT_LOCATION").unwrap_or(defaults.weather.location),
                max_forecast_days: env::var("FORECAST_MAX_DAYS")
                    .unwrap_or_else(|_| defaults.weather.max_forecast_days.to_string())
                    .parse()
                    .context("Invalid FORECAST_MAX_DAYS value")?,
            },
            holidays: HolidayConfig {
                country: env::var("HOLIDAY_COUNTRY").unwrap_or(defaults.holidays.country),
                region: match env::var("HOLIDAY_REGION") {
                    Ok(region) if region.trim().is_empty() => None,
                    Ok(region) => Some(region),
                    Err(_) => defaults.holidays.region,
                },
            },
            // Reference date is not loaded from env vars - set programmatically
            reference_date: None,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=DEFAULT_MAX_FORECAST_DAYS).contains(&self.weather.max_forecast_days) {
            anyhow::bail!(
                "FORECAST_MAX_DAYS must be between 1 and {} (got {})",
                DEFAULT_MAX_FORECAST_DAYS,
                self.weather.max_forecast_days
            );
        }

        let base_score = self.artifacts.model_base_score;
        if !(base_score > 0.0 && base_score < 1.0) {
            anyhow::bail!("MODEL_BASE_SCORE must be a probability in (0, 1) (got {})", base_score);
        }

        if self.weather.location.trim().is_empty() {
            anyhow::bail!("RESTAURANT_LOCATION cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            artifacts: ArtifactConfig {
                model_path: PathBuf::from("xgboost_model.json"),
                model_base_score: 0.5,
                model_columns_path: PathBuf::from("model_columns.json"),
                menu_data_path: PathBuf::from("full_details_for_app.csv"),
                holidays_path: PathBuf::from("holidays.json"),
                weather_api_key_path: PathBuf::from("api_key.txt"),
            },
            weather: WeatherConfig {
                api_url: DEFAULT_WEATHER_API_URL.to_string(),
                location: "Tamil Nadu".to_string(),
                max_forecast_days: DEFAULT_MAX_FORECAST_DAYS,
            },
            holidays: HolidayConfig {
                country: "IN".to_string(),
                region: Some("TN".to_string()),
            },
            reference_date: None,
        }
    }
}
