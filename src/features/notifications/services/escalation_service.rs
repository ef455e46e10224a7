use std::time::Duration;

use crate::core::config::EscalationConfig;
use crate::features::reports::models::Report;

/// Sends out-of-band escalation notices through an external webhook
/// (mail gateway, pager, etc.). The collaborator is opaque to us; delivery
/// is best-effort and failures never reach the caller.
pub struct EscalationService {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl EscalationService {
    pub fn new(config: EscalationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            webhook_url: config.webhook_url,
        }
    }

    /// Fire an escalation notice for a report. Logged and swallowed on
    /// failure or when no webhook is configured.
    pub async fn send_escalation(&self, report: &Report, escalated_by: &str, reason: &str) {
        let Some(url) = &self.webhook_url else {
            tracing::debug!(
                "No escalation webhook configured, skipping notice for report {}",
                report.id
            );
            return;
        };

        let payload = serde_json::json!({
            "report_id": report.id,
            "title": report.title,
            "reporter_id": report.reporter_id,
            "status": report.status.to_string(),
            "escalated_by": escalated_by,
            "reason": reason,
        });

        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("Escalation notice sent for report {}", report.id);
            }
            Ok(resp) => {
                tracing::warn!(
                    "Escalation webhook returned {} for report {}",
                    resp.status(),
                    report.id
                );
            }
            Err(e) => {
                tracing::warn!("Failed to send escalation notice for report {}: {}", report.id, e);
            }
        }
    }
}
