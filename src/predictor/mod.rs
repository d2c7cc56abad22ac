//! Prediction service
//! Coordinates one request: date → weather → calendar → features → model → aggregation

pub mod aggregate;

pub use aggregate::{detailed_breakdown, format_percent, overall_ranking, DetailedPrediction, OverallPrediction};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    data::{load_menu, DataError, HolidayCalendar, MenuItem, WeatherClient, WeatherSlice},
    ml::{align_to_schema, build_feature_rows, CalendarFacts, Classifier, ModelError, ModelSchema, XGBoostModel},
};

lazy_static! {
    static ref DATE_PATTERN: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex");
}

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Invalid date format. Please use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid hour {0}: target_hour must be between 0 and 23.")]
    InvalidHour(u32),

    #[error("{0}")]
    OutOfRange(DataError),

    #[error("API or data parsing error: {0}")]
    Upstream(DataError),

    #[error("Model input error: {0}")]
    ModelInput(#[from] ModelError),
}

impl From<DataError> for PredictionError {
    fn from(err: DataError) -> Self {
        if err.is_out_of_range() {
            PredictionError::OutOfRange(err)
        } else {
            PredictionError::Upstream(err)
        }
    }
}

impl PredictionError {
    /// Expected business errors; everything else means the artifacts are
    /// out of sync and needs an operator.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictionError::ModelInput(_))
    }
}

pub type PredictionResult<T> = Result<T, PredictionError>;

/// Inbound prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub target_date: String,
    pub target_hour: u32,
    pub is_special_event: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetadata {
    pub target_date: String,
    pub target_hour: u32,
    pub is_special_event: bool,
    pub is_public_holiday: bool,
    pub day_of_week: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub wind_kph: f64,
    pub cloud_percent: f64,
    pub humidity: f64,
    pub pressure_mb: f64,
}

impl From<&WeatherSlice> for WeatherConditions {
    fn from(slice: &WeatherSlice) -> Self {
        Self {
            temperature_c: slice.temp_c,
            precipitation_mm: slice.precip_mm,
            wind_kph: slice.wind_kph,
            cloud_percent: slice.cloud,
            humidity: slice.humidity,
            pressure_mb: slice.pressure_mb,
        }
    }
}

/// Success envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction_metadata: PredictionMetadata,
    pub weather_conditions: WeatherConditions,
    pub overall_prediction: Vec<OverallPrediction>,
    pub detailed_prediction: Vec<DetailedPrediction>,
}

/// Read-only state built once at startup and shared by every request
pub struct PredictorContext {
    pub config: Config,
    pub classifier: Box<dyn Classifier>,
    pub schema: ModelSchema,
    pub menu: Vec<MenuItem>,
    pub holidays: HolidayCalendar,
    pub weather: WeatherClient,
}

impl PredictorContext {
    /// Load every artifact named in the config. Any missing or unreadable
    /// artifact aborts startup.
    pub fn load(config: Config) -> Result<Self> {
        let paths = &config.artifacts;

        let classifier = XGBoostModel::load(&paths.model_path, paths.model_base_score)
            .with_context(|| format!("Could not load model from {}", paths.model_path.display()))?;
        info!("Loaded classifier with {} trees", classifier.num_trees());

        let schema = ModelSchema::load(&paths.model_columns_path).with_context(|| {
            format!("Could not load model columns from {}", paths.model_columns_path.display())
        })?;

        let menu = load_menu(&paths.menu_data_path)
            .with_context(|| format!("Could not load menu data from {}", paths.menu_data_path.display()))?;

        let holidays = HolidayCalendar::load(
            &paths.holidays_path,
            &config.holidays.country,
            config.holidays.region.as_deref(),
        )
        .with_context(|| format!("Could not load holidays from {}", paths.holidays_path.display()))?;

        let api_key = std::fs::read_to_string(&paths.weather_api_key_path)
            .with_context(|| {
                format!("Could not read weather API key from {}", paths.weather_api_key_path.display())
            })?
            .trim()
            .to_string();
        if api_key.is_empty() {
            anyhow::bail!("Weather API key file {} is empty", paths.weather_api_key_path.display());
        }

        let weather = WeatherClient::from_config(&config, api_key).context("Could not build weather client")?;

        Self::new(config, Box::new(classifier), schema, menu, holidays, weather)
    }

    /// Assemble a context from already-loaded parts
    pub fn new(
        config: Config,
        classifier: Box<dyn Classifier>,
        schema: ModelSchema,
        menu: Vec<MenuItem>,
        holidays: HolidayCalendar,
        weather: WeatherClient,
    ) -> Result<Self> {
        if menu.is_empty() {
            anyhow::bail!("Menu reference set is empty");
        }

        if let Some(required) = classifier.required_features() {
            if schema.len() < required {
                warn!(
                    "Model reads {} features but schema lists {} columns; predictions will fail",
                    required,
                    schema.len()
                );
            }
        }

        info!(
            "Predictor ready: {} menu items, {} model columns, {} holidays",
            menu.len(),
            schema.len(),
            holidays.len()
        );

        Ok(Self {
            config,
            classifier,
            schema,
            menu,
            holidays,
            weather,
        })
    }
}

/// Parse a `YYYY-MM-DD` date; anything else is rejected.
pub fn parse_target_date(raw: &str) -> PredictionResult<NaiveDate> {
    if !DATE_PATTERN.is_match(raw) {
        return Err(PredictionError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| PredictionError::InvalidDate(raw.to_string()))
}

#[derive(Clone)]
pub struct PredictionService {
    context: Arc<PredictorContext>,
}

impl PredictionService {
    pub fn new(context: Arc<PredictorContext>) -> Self {
        Self { context }
    }

    /// Run one prediction. Either the full envelope or a single error comes
    /// back; nothing partial.
    pub async fn predict(&self, request: &PredictionRequest) -> PredictionResult<PredictionResponse> {
        let ctx = &self.context;

        // Step 1: Parse and validate inputs
        let target_date = parse_target_date(&request.target_date)?;
        if request.target_hour > 23 {
            return Err(PredictionError::InvalidHour(request.target_hour));
        }

        info!(
            "Predicting orders for {} {:02}:00 (special event: {})",
            target_date, request.target_hour, request.is_special_event
        );

        // Step 2: Fetch weather
        let weather = ctx
            .weather
            .fetch_hour(
                &ctx.config.weather.location,
                target_date,
                request.target_hour,
                ctx.config.get_effective_date(),
            )
            .await
            .map_err(|e| {
                if e.is_out_of_range() {
                    warn!("Rejected {}: {}", target_date, e);
                } else {
                    error!("Weather lookup failed: {}", e);
                }
                PredictionError::from(e)
            })?;

        // Step 3: Calendar facts
        let calendar = CalendarFacts::for_date(target_date, &ctx.holidays);
        if let Some(name) = ctx.holidays.holiday_name(target_date) {
            info!("{} is a public holiday ({})", target_date, name);
        }

        // Step 4: Features → model → aggregation
        let rows = build_feature_rows(
            request.target_hour,
            request.is_special_event,
            &calendar,
            &weather,
            &ctx.menu,
        );
        let matrix = align_to_schema(&rows, &ctx.schema)?;
        let probabilities = ctx.classifier.predict_proba(&matrix).map_err(|e| {
            error!("Classifier rejected aligned features: {}", e);
            PredictionError::ModelInput(e)
        })?;

        if probabilities.len() != rows.len() {
            error!(
                "Classifier returned {} probabilities for {} rows",
                probabilities.len(),
                rows.len()
            );
            return Err(PredictionError::ModelInput(ModelError::ShapeMismatch {
                expected: rows.len(),
                got: probabilities.len(),
            }));
        }

        let overall_prediction = overall_ranking(&rows, &probabilities);
        let detailed_prediction = detailed_breakdown(&rows, &probabilities);

        // Step 5: Envelope
        Ok(PredictionResponse {
            prediction_metadata: PredictionMetadata {
                target_date: request.target_date.clone(),
                target_hour: request.target_hour,
                is_special_event: request.is_special_event,
                is_public_holiday: calendar.is_holiday,
                day_of_week: calendar.day_name().to_string(),
            },
            weather_conditions: WeatherConditions::from(&weather),
            overall_prediction,
            detailed_prediction,
        })
    }
}
