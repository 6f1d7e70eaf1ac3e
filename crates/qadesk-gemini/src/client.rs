// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! One request per call. Failures are returned as-is; nothing is retried.

use std::time::Duration;

use qadesk_core::QadeskError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Builds a client that authenticates with the `x-goog-api-key` header.
    pub fn new(settings: ClientSettings) -> Result<Self, QadeskError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&settings.api_key)
                .map_err(|e| QadeskError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| QadeskError::Generator {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: settings.model,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Model identifier used in the request path.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Sends one request and returns the parsed response.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, QadeskError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| QadeskError::Generator {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        let body = response.text().await.map_err(|e| QadeskError::Generator {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({} {}): {}",
                    api_err.error.code, api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(QadeskError::Generator {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| QadeskError::Generator {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
