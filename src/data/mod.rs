//! Data inputs for the predictor: static menu reference, holiday calendar
//! and live weather forecasts

pub mod errors;
pub mod holidays;
pub mod menu;
pub mod weather;

// Re-export commonly used types
pub use errors::{DataError, DataResult};
pub use holidays::{HolidayCalendar, HolidayEntry};
pub use menu::{load_menu, MenuItem};
pub use weather::{WeatherClient, WeatherSlice};

/// Validation helpers
pub mod validation {
    use super::*;

    /// Validate an hour of day (0-23)
    pub fn validate_hour(hour: i64) -> DataResult<u32> {
        if !(0..=23).contains(&hour) {
            return Err(DataError::validation_error(
                "target_hour",
                "target_hour must be between 0 and 23",
            ));
        }
        Ok(hour as u32)
    }

    /// Validate a single weather slice before it is fed to the model
    pub fn validate_weather_slice(slice: &WeatherSlice) -> DataResult<()> {
        if !(0.0..=100.0).contains(&slice.cloud) {
            return Err(DataError::validation_error("cloud", "Cloud cover must be a percentage"));
        }

        if !(0.0..=100.0).contains(&slice.humidity) {
            return Err(DataError::validation_error("humidity", "Humidity must be a percentage"));
        }

        if slice.precip_mm < 0.0 {
            return Err(DataError::validation_error("precip_mm", "Precipitation cannot be negative"));
        }

        if slice.wind_kph < 0.0 {
            return Err(DataError::validation_error("wind_kph", "Wind speed cannot be negative"));
        }

        Ok(())
    }
}
