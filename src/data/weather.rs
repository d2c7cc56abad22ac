use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DataError, DataResult};

pub const DEFAULT_WEATHER_API_URL: &str = "http://api.weatherapi.com/v1/forecast.json";

/// Forecast provider limit on how far ahead it can answer
pub const DEFAULT_MAX_FORECAST_DAYS: i64 = 14;

/// Weather attributes for one forecast hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSlice {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub precip_mm: f64,
    pub cloud: f64,
    pub humidity: f64,
    pub pressure_mb: f64,
}

/// WeatherAPI forecast response structures
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    hour: Vec<WeatherSlice>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Number of forecast days to request so that the last returned day is
/// `target`; `today` itself counts as day 1.
pub fn forecast_days(target: NaiveDate, today: NaiveDate) -> i64 {
    (target - today).num_days() + 1
}

pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_forecast_days: i64,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> DataResult<Self> {
        // No timeout override: the transport default applies.
        let client = reqwest::Client::builder()
            .user_agent(concat!("menucast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_forecast_days: DEFAULT_MAX_FORECAST_DAYS,
        })
    }

    pub fn with_max_forecast_days(mut self, days: i64) -> Self {
        self.max_forecast_days = days;
        self
    }

    /// Create client from config::Config and the credential read at startup
    pub fn from_config(config: &crate::config::Config, api_key: impl Into<String>) -> DataResult<Self> {
        Ok(Self::new(config.weather.api_url.clone(), api_key)?
            .with_max_forecast_days(config.weather.max_forecast_days))
    }

    pub fn max_forecast_days(&self) -> i64 {
        self.max_forecast_days
    }

    /// Fetch the forecast slice for `hour` on `target`.
    ///
    /// Fails with `DataError::OutOfRange` before any outbound call when the
    /// date lies in the past or beyond the provider window. Single attempt,
    /// no retry.
    pub async fn fetch_hour(
        &self,
        location: &str,
        target: NaiveDate,
        hour: u32,
        today: NaiveDate,
    ) -> DataResult<WeatherSlice> {
        let days = forecast_days(target, today);
        if !(days > 0 && days <= self.max_forecast_days) {
            return Err(DataError::OutOfRange {
                days,
                max_days: self.max_forecast_days,
            });
        }

        tracing::info!(
            "Fetching weather forecast for {} on {} at {:02}:00 ({} days)",
            location,
            target,
            hour,
            days
        );
        tracing::debug!(
            "Weather API request: GET {}?key=***&q={}&days={}",
            self.base_url,
            location,
            days
        );

        let days_param = days.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", days_param.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);

            tracing::error!("Weather API failed ({}): {}", status_code, message);
            return Err(DataError::api_error(status_code, message));
        }

        let forecast: ForecastResponse = response.json().await?;
        let slice = select_hour(forecast, hour)?;
        super::validation::validate_weather_slice(&slice)?;

        Ok(slice)
    }
}

fn select_hour(response: ForecastResponse, hour: u32) -> DataResult<WeatherSlice> {
    let last_day = response
        .forecast
        .forecastday
        .into_iter()
        .last()
        .ok_or_else(|| DataError::parse_error("forecast.forecastday is empty"))?;

    last_day
        .hour
        .into_iter()
        .nth(hour as usize)
        .ok_or(DataError::MissingHour { hour })
}
