//! Severity Classifier Client
//!
//! Client for the externally hosted accident severity model. Feature payloads
//! are forwarded untouched and the model's JSON answer is returned as is.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::SeverityConfig;
use crate::error::{AppError, AppResult};

/// Client for the severity classifier microservice
#[derive(Clone)]
pub struct SeverityClassifierClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: Client,
}

impl SeverityClassifierClient {
    /// Create a new severity classifier client
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            api_key,
            http_client,
        })
    }

    /// Build a client when an endpoint is configured
    pub fn from_config(config: &SeverityConfig) -> AppResult<Option<Self>> {
        match &config.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => Self::new(
                endpoint.clone(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a feature payload for classification
    pub async fn predict(&self, features: &Value) -> AppResult<Value> {
        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(features);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse response: {}", e)))
    }
}
