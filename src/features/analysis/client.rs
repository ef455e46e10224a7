use std::time::Duration;

use serde::Deserialize;

use crate::core::config::AnalysisConfig;
use crate::features::reports::models::ReportCategory;

/// Classification produced by the external AI analysis service from citizen
/// photo/voice/text input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResult {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ReportCategory>,
    #[serde(default)]
    pub confidence: f64,
    pub severity: Option<String>,
    pub priority: Option<i32>,
}

/// Client for the black-box analysis service that pre-fills report fields.
///
/// The service is a pure external collaborator: any failure (or a missing
/// base URL) yields the default result, and report creation proceeds with
/// whatever the citizen supplied.
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl AnalysisClient {
    pub fn new(config: AnalysisConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url,
        }
    }

    pub async fn analyze_text(&self, text: &str) -> AnalysisResult {
        let Some(base_url) = &self.base_url else {
            return AnalysisResult::default();
        };

        let url = format!("{}/analyze", base_url.trim_end_matches('/'));
        let body = serde_json::json!({ "text": text });

        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<AnalysisResult>().await {
                    Ok(result) => {
                        tracing::debug!(
                            "Analysis classified input as {:?} (confidence {:.2})",
                            result.category,
                            result.confidence
                        );
                        result
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse analysis response: {}", e);
                        AnalysisResult::default()
                    }
                }
            }
            Ok(resp) => {
                tracing::warn!("Analysis service returned {}", resp.status());
                AnalysisResult::default()
            }
            Err(e) => {
                tracing::warn!("Analysis service unreachable: {}", e);
                AnalysisResult::default()
            }
        }
    }
}
