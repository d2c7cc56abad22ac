// menucast - Restaurant Order Prediction API
// Predicts how likely each menu item is to be ordered (dine-in vs takeaway) for a
// future date and hour, from a trained classifier, the menu and the weather forecast.

#![deny(clippy::unwrap_used)]

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod ml;
pub mod predictor;

// Re-export commonly used items
pub use config::Config;
pub use data::{MenuItem, WeatherSlice};
pub use predictor::{PredictionError, PredictionRequest, PredictionResponse, PredictionService, PredictorContext};
