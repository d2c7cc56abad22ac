use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::predictor::{PredictionRequest, PredictionService, PredictorContext};

fn load_service(config: Config) -> Result<PredictionService> {
    info!("📦 Loading model artifacts");
    let context = PredictorContext::load(config).context("Could not initialize predictor")?;
    Ok(PredictionService::new(Arc::new(context)))
}

/// Load artifacts and serve the HTTP API
pub async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.port))?;

    let service = load_service(config)?;
    crate::api::serve(addr, service).await
}

/// Run one prediction and print the envelope (or the error detail) as JSON
pub async fn predict(config: Config, date: NaiveDate, hour: u32, special_event: bool) -> Result<()> {
    let service = load_service(config)?;

    let request = PredictionRequest {
        target_date: date.format("%Y-%m-%d").to_string(),
        target_hour: hour,
        is_special_event: special_event,
    };

    match service.predict(&request).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::json!({ "detail": err.to_string() }));
            Err(err.into())
        }
    }
}
