use crate::core::currency::RateSource;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate source backed by the exchangerate-api.com v6 `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: BTreeMap<String, f64>,
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateApiFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<BTreeMap<String, f64>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("API key for exchangerate-api.com is not configured"))?;

        let base = base.to_uppercase();
        let url = format!("{}/v6/{}/latest/{}", self.base_url, api_key, base);
        debug!("Requesting rates from {}/v6/***/latest/{}", self.base_url, base);

        let client = reqwest::Client::builder()
            .user_agent("xconv/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "Request error: {} for base currency: {}",
                    e.without_url(),
                    base
                )
            })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        if data.result != "success" {
            return Err(anyhow!(
                "Rate API returned error: {} for base currency: {}",
                data.error_type.as_deref().unwrap_or(&data.result),
                base
            ));
        }

        if data.conversion_rates.is_empty() {
            return Err(anyhow!("No rate data found for base currency: {}", base));
        }

        debug!("Received {} rates", data.conversion_rates.len());
        Ok(data.conversion_rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v6/test-key/latest/{base}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "RUB",
            "conversion_rates": {
                "RUB": 1,
                "USD": 0.011,
                "EUR": 0.0102
            }
        }"#;
        let mock_server = create_mock_server("RUB", 200, mock_response).await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Some("test-key"));
        let rates = provider.fetch_rates("rub").await.unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["RUB"], 1.0);
        assert_eq!(rates["USD"], 0.011);
        assert_eq!(rates["EUR"], 0.0102);
    }

    #[tokio::test]
    async fn test_api_error_result() {
        let mock_response = r#"{"result": "error", "error-type": "invalid-key"}"#;
        let mock_server = create_mock_server("RUB", 200, mock_response).await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Some("test-key"));
        let result = provider.fetch_rates("RUB").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Rate API returned error: invalid-key for base currency: RUB"
        );
    }

    #[tokio::test]
    async fn test_http_error_response() {
        let mock_server = create_mock_server("RUB", 500, "").await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Some("test-key"));
        let result = provider.fetch_rates("RUB").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for base currency: RUB"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server("RUB", 200, r#"{"conversion": "#).await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Some("test-key"));
        let result = provider.fetch_rates("RUB").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for RUB")
        );
    }

    #[tokio::test]
    async fn test_empty_rates() {
        let mock_server =
            create_mock_server("RUB", 200, r#"{"result": "success", "conversion_rates": {}}"#)
                .await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Some("test-key"));
        assert_eq!(
            provider.fetch_rates("RUB").await.unwrap_err().to_string(),
            "No rate data found for base currency: RUB"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let provider = ExchangeRateApiProvider::new("http://127.0.0.1:9", None);
        assert_eq!(
            provider.fetch_rates("RUB").await.unwrap_err().to_string(),
            "API key for exchangerate-api.com is not configured"
        );

        let provider = ExchangeRateApiProvider::new("http://127.0.0.1:9", Some("  "));
        assert!(provider.fetch_rates("RUB").await.is_err());
    }
}
