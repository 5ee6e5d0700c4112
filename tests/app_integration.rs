use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;
use xconv::AppCommand;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const RUB_RATES: &str = r#"{
        "result": "success",
        "base_code": "RUB",
        "conversion_rates": {
            "RUB": 1,
            "USD": 0.011,
            "EUR": 0.01,
            "CNY": 0.078
        }
    }"#;

    pub async fn create_rates_server(base: &str, mock_response: &str, calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v6/test-key/latest/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(calls)
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(dir: &Path, base_url: &str, demo_fallback: bool) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
        base_currency: "RUB"
        providers:
          exchangerate:
            base_url: {}
            api_key: "test-key"
        demo_fallback: {}
        data_path: {}
    "#,
        base_url,
        demo_fallback,
        dir.display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path
}

fn currency(amount: f64, from: &str, to: &str) -> AppCommand {
    AppCommand::Currency {
        amount,
        from: from.to_string(),
        to: to.to_string(),
    }
}

#[test_log::test(tokio::test)]
async fn test_currency_flow_populates_cache() {
    // Second run must be served from the cache, so the source is hit once.
    let mock_server = test_utils::create_rates_server("RUB", test_utils::RUB_RATES, 1).await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri(), false);
    let config_path = config_path.to_str().unwrap();

    let result = xconv::run_command(currency(100.0, "USD", "EUR"), Some(config_path)).await;
    assert!(result.is_ok(), "Currency command failed with: {:?}", result.err());

    let cache_file = dir.path().join("exchange_rates_cache.json");
    assert!(cache_file.exists());
    let cached: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cache_file).unwrap()).unwrap();
    info!(?cached, "Cache written");
    assert_eq!(cached["base"], "RUB");
    assert_eq!(cached["rates"]["USD"], 0.011);
    assert!(cached["timestamp"].is_string());

    let result = xconv::run_command(currency(5000.0, "RUB", "CNY"), Some(config_path)).await;
    assert!(result.is_ok(), "Cached run failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_unknown_currency_fails() {
    let mock_server = test_utils::create_rates_server("RUB", test_utils::RUB_RATES, 1).await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri(), false);

    let result = xconv::run_command(
        currency(1.0, "USD", "XYZ"),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Unknown currency should fail");
    assert!(err.to_string().contains("Unknown currency: XYZ"));
}

#[test_log::test(tokio::test)]
async fn test_refresh_without_source_uses_demo_rates() {
    // Nothing is mounted, so every rate request gets a 404.
    let mock_server = wiremock::MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri(), true);

    let result = xconv::run_command(AppCommand::Refresh, Some(config_path.to_str().unwrap())).await;
    assert!(result.is_ok(), "Refresh failed with: {:?}", result.err());
    assert!(!dir.path().join("exchange_rates_cache.json").exists());
}

#[test_log::test(tokio::test)]
async fn test_currency_fails_without_rates_or_fallback() {
    let mock_server = wiremock::MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri(), false);

    let result = xconv::run_command(
        currency(1.0, "USD", "EUR"),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_unit_commands() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), "http://127.0.0.1:9", false);
    let config_path = config_path.to_str().unwrap();

    let ok = xconv::run_command(
        AppCommand::Unit {
            value: -40.0,
            from: "°F".to_string(),
            to: "°C".to_string(),
        },
        Some(config_path),
    )
    .await;
    assert!(ok.is_ok(), "Unit command failed with: {:?}", ok.err());

    let err = xconv::run_command(
        AppCommand::Unit {
            value: 1.0,
            from: "м".to_string(),
            to: "кг".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect_err("Incompatible units should fail");
    assert!(err.to_string().contains("Incompatible units"));

    let listed = xconv::run_command(AppCommand::Units { category: None }, Some(config_path)).await;
    assert!(listed.is_ok());
    let listed = xconv::run_command(
        AppCommand::Units {
            category: Some("давление".to_string()),
        },
        Some(config_path),
    )
    .await;
    assert!(listed.is_ok());
}

#[test_log::test(tokio::test)]
async fn test_batch_with_export() {
    let mock_server = test_utils::create_rates_server("RUB", test_utils::RUB_RATES, 1).await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri(), false);

    let input = dir.path().join("batch.txt");
    fs::write(
        &input,
        "# trip planning\n1 морская миля -> км\n1000 RUB -> USD\n100 °C -> °F\n2 л -> кг\n",
    )
    .unwrap();
    let report = dir.path().join("history.txt");

    let result = xconv::run_command(
        AppCommand::Batch {
            input: input.clone(),
            export: Some(Some(report.clone())),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Batch failed with: {:?}", result.err());

    let content = fs::read_to_string(&report).unwrap();
    info!(%content, "Exported report");
    assert!(content.starts_with("Conversion history"));
    assert!(content.contains("морская миля"));
    assert!(content.contains("Rate: 1 RUB = 0.011000 USD"));
    assert!(!content.contains("кг"));
}

#[test_log::test(tokio::test)]
async fn test_batch_export_to_default_report_name() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), "http://127.0.0.1:9", false);

    let input = dir.path().join("batch.txt");
    fs::write(&input, "3 фут -> м\n").unwrap();

    let result = xconv::run_command(
        AppCommand::Batch {
            input,
            export: Some(None),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Batch failed with: {:?}", result.err());

    let reports: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("history_") && name.ends_with(".txt"))
        .collect();
    assert_eq!(reports.len(), 1, "Expected one report, found {reports:?}");

    let content = fs::read_to_string(dir.path().join(&reports[0])).unwrap();
    assert!(content.contains("3 фут → 0.9144 м"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");

    let result = xconv::run_command(AppCommand::Currencies, Some(missing.to_str().unwrap())).await;
    let err = result.expect_err("Missing config should fail");
    assert!(err.to_string().contains("Failed to read config file"));
}
