use anyhow::Result;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use menucast::config::Config;
use menucast::predictor::PredictorContext;

/// Write a minimal but complete artifact set: a one-tree dump over three
/// columns, its schema, a menu CSV, a holiday file and an API key.
fn write_artifacts(dir: &Path) -> Result<Config> {
    // One stump on column 2: Dine In → +1, Take Away → -1
    let model = json!([{
        "nodeid": 0, "depth": 0, "split": "f2", "split_condition": 0.5,
        "yes": 1, "no": 2, "missing": 1,
        "children": [{"nodeid": 1, "leaf": -1.0}, {"nodeid": 2, "leaf": 1.0}]
    }]);
    std::fs::write(dir.join("model.json"), model.to_string())?;
    std::fs::write(
        dir.join("columns.json"),
        json!(["hour", "is_holiday", "order_type_Dine In"]).to_string(),
    )?;
    std::fs::write(
        dir.join("menu.csv"),
        "food_item_name,food_item_category,price\nDosa,Breakfast,60\nCoffee,Beverages,25\nDosa,Breakfast,60\n",
    )?;
    std::fs::write(
        dir.join("holidays.json"),
        json!([{"date": "2024-12-25", "name": "Christmas", "country": "IN"}]).to_string(),
    )?;
    std::fs::write(dir.join("api_key.txt"), "secret-key\n")?;

    let mut config = Config::default();
    config.artifacts.model_path = dir.join("model.json");
    config.artifacts.model_columns_path = dir.join("columns.json");
    config.artifacts.menu_data_path = dir.join("menu.csv");
    config.artifacts.holidays_path = dir.join("holidays.json");
    config.artifacts.weather_api_key_path = dir.join("api_key.txt");
    Ok(config)
}

#[test]
fn test_config_invalid_forecast_window() {
    std::env::set_var("FORECAST_MAX_DAYS", "30");
    let result = Config::load();
    std::env::remove_var("FORECAST_MAX_DAYS");

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("FORECAST_MAX_DAYS"));
}

#[test]
fn test_load_context_from_artifacts() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_artifacts(dir.path())?;

    let context = PredictorContext::load(config)?;
    assert_eq!(context.menu.len(), 2);
    assert_eq!(context.menu[0].name, "Dosa");
    assert_eq!(context.schema.len(), 3);
    assert_eq!(context.classifier.required_features(), Some(3));
    assert_eq!(context.holidays.len(), 1);
    Ok(())
}

#[test]
fn test_missing_artifact_aborts_startup() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_artifacts(dir.path())?;
    std::fs::remove_file(dir.path().join("api_key.txt"))?;

    let err = PredictorContext::load(config).err().map(|e| format!("{:#}", e)).unwrap_or_default();
    assert!(err.contains("api_key.txt"), "unexpected error: {}", err);
    Ok(())
}

#[test]
fn test_empty_api_key_aborts_startup() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_artifacts(dir.path())?;
    std::fs::write(dir.path().join("api_key.txt"), "  \n")?;

    assert!(PredictorContext::load(config).is_err());
    Ok(())
}

#[test]
fn test_corrupt_model_aborts_startup() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_artifacts(dir.path())?;
    std::fs::write(dir.path().join("model.json"), "{\"learner\": {}}")?;

    let err = PredictorContext::load(config).err().map(|e| format!("{:#}", e)).unwrap_or_default();
    assert!(err.contains("Could not load model"), "unexpected error: {}", err);
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_with_tree_model() -> Result<()> {
    use menucast::predictor::{PredictionRequest, PredictionService};
    use std::sync::Arc;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let hours: Vec<_> = (0..24)
        .map(|_| json!({"temp_c": 26, "wind_kph": 8, "precip_mm": 0, "cloud": 20, "humidity": 65, "pressure_mb": 1010}))
        .collect();
    Mock::given(method("GET"))
        .and(query_param("key", "secret-key"))
        .and(query_param("days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "forecast": {"forecastday": [{"hour": hours.clone()}, {"hour": hours}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let mut config = write_artifacts(dir.path())?;
    config.weather.api_url = format!("{}/v1/forecast.json", server.uri());
    config.reference_date = chrono::NaiveDate::from_ymd_opt(2024, 12, 24);

    let service = PredictionService::new(Arc::new(PredictorContext::load(config)?));
    let response = service
        .predict(&PredictionRequest {
            target_date: "2024-12-25".to_string(),
            target_hour: 20,
            is_special_event: false,
        })
        .await?;

    assert!(response.prediction_metadata.is_public_holiday);
    // Dine In → margin +1, Take Away → margin -1
    assert_eq!(response.overall_prediction.len(), 2);
    assert!(response.overall_prediction.iter().all(|o| o.probability == "50.00%"));
    assert_eq!(response.overall_prediction[0].food_item_name, "Dosa");
    for row in &response.detailed_prediction {
        assert_eq!(row.dine_in, "73.11%");
        assert_eq!(row.take_away, "26.89%");
    }
    Ok(())
}
