// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini report generator for qadesk.
//!
//! Implements [`ReportGenerator`] on top of the `generateContent` endpoint.
//! API key resolution order: config -> `GEMINI_API_KEY` -> `API_KEY` -> error.

pub mod client;
pub mod prompt;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use qadesk_config::model::GeneratorConfig;
use qadesk_core::{QadeskError, ReportGenerator, ReportRequest};
use tracing::{debug, info, warn};

use crate::client::{ClientSettings, GeminiClient};
use crate::types::GenerateContentRequest;

/// Environment variables consulted when the config has no key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Gemini-backed [`ReportGenerator`].
pub struct GeminiGenerator {
    client: GeminiClient,
    temperature: f32,
}

impl GeminiGenerator {
    /// Creates a generator from the `[generator]` config section.
    pub fn new(config: &GeneratorConfig) -> Result<Self, QadeskError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), |name| {
            std::env::var(name).ok()
        })?;

        let client = GeminiClient::new(ClientSettings {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })?;

        info!(model = %config.model, "Gemini generator initialized");
        Ok(Self {
            client,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ReportGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &ReportRequest) -> Result<String, QadeskError> {
        let prompt = prompt::build_prompt(&request.report);
        debug!(
            project = %request.project,
            action = %request.report.action(),
            prompt_chars = prompt.chars().count(),
            "requesting report"
        );

        let body = GenerateContentRequest::from_prompt(prompt, self.temperature);
        let response = self.client.generate_content(&body).await?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                warn!(model = %self.client.model(), "generator returned no text");
                Err(QadeskError::EmptyResponse)
            }
        }
    }
}

/// Picks the API key from config, falling back to [`API_KEY_ENV_VARS`].
///
/// Blank values count as unset.
pub fn resolve_api_key(
    config_key: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, QadeskError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.to_string());
    }

    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            QadeskError::Config(
                "Gemini API key not found. Set generator.api_key in config or the GEMINI_API_KEY environment variable.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadesk_core::{BugReport, Project, ReportData, RetestReport, Solved};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn config_key_wins() {
        let key = resolve_api_key(Some("cfg"), |_| Some("env".into())).unwrap();
        assert_eq!(key, "cfg");
    }

    #[test]
    fn blank_config_key_falls_back_in_order() {
        let key = resolve_api_key(Some("  "), |name| match name {
            "GEMINI_API_KEY" => Some(String::new()),
            "API_KEY" => Some("legacy".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key, "legacy");

        let key = resolve_api_key(None, |name| Some(format!("{name}-value"))).unwrap();
        assert_eq!(key, "GEMINI_API_KEY-value");
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = resolve_api_key(None, no_env).unwrap_err();
        assert!(matches!(err, QadeskError::Config(ref m) if m.contains("API key not found")));
    }

    fn generator_for(server: &MockServer) -> GeminiGenerator {
        let config = GeneratorConfig {
            api_key: Some("test-key".into()),
            model: "gemini-test".into(),
            base_url: server.uri(),
            ..GeneratorConfig::default()
        };
        GeminiGenerator::new(&config).unwrap()
    }

    fn retest_request() -> ReportRequest {
        ReportRequest {
            project: Project::Bpagos,
            report: ReportData::Retest(RetestReport {
                bug_code: "1234".into(),
                browser: "brave".into(),
                solved: Solved::Yes,
                ..RetestReport::default()
            }),
        }
    }

    #[tokio::test]
    async fn generate_returns_model_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(body_string_contains("Browser: Brave Browser"))
            .and(body_string_contains("Resultado del retest: Solucionado"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Nombre del defecto original: 1234"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator_for(&server)
            .generate(&retest_request())
            .await
            .unwrap();
        assert_eq!(text, "Nombre del defecto original: 1234");
    }

    #[tokio::test]
    async fn blank_text_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "  \n"}]}}]
            })))
            .mount(&server)
            .await;

        let request = ReportRequest {
            project: Project::Getnet,
            report: ReportData::Bug(BugReport::default()),
        };
        let err = generator_for(&server).generate(&request).await.unwrap_err();
        assert!(matches!(err, QadeskError::EmptyResponse));
    }

    #[tokio::test]
    async fn no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = generator_for(&server)
            .generate(&retest_request())
            .await
            .unwrap_err();
        assert!(matches!(err, QadeskError::EmptyResponse));
    }
}
