use super::alert_queue::{AlertEvent, AlertSink};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use url::Url;

const CONTENT_LIMIT: usize = 2000;
const TRUNCATION_SUFFIX: &str = "\n... (truncated)";

/// Posts alerts to a Discord-compatible incoming webhook as `{"content": ...}`.
pub(crate) struct WebhookSink {
    webhook_url: Url,
    client: Client,
}

impl WebhookSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn render(event: &AlertEvent) -> String {
    let mut lines = vec![format!(
        "**{}** `{}` `{}` `{}`",
        event.service_name,
        event.environment,
        event.component,
        event.level.as_str()
    )];

    let mut origin = format!(
        "`{}` `{}`",
        event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        event.target
    );
    if let Some(location) = &event.location {
        origin.push_str(&format!(" `{location}`"));
    }
    lines.push(origin);

    if let Some(message) = event.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(format!("> {message}"));
    }
    if !event.span_path.is_empty() {
        lines.push(format!("spans: `{}`", event.span_path.join(" > ")));
    }
    for (key, value) in &event.fields {
        lines.push(format!("- `{key}` = `{value}`"));
    }

    truncate(lines.join("\n"))
}

fn truncate(content: String) -> String {
    if content.chars().count() <= CONTENT_LIMIT {
        return content;
    }
    let keep = CONTENT_LIMIT - TRUNCATION_SUFFIX.chars().count();
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "content": render(event) }))
            .send()
            .await
            // reqwest errors echo the URL, which carries the webhook token.
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow!("alert webhook request timed out")
                } else if err.is_connect() {
                    anyhow!("alert webhook connection failed")
                } else {
                    anyhow!("alert webhook request failed")
                }
            })?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "alert webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tracing::Level;

    fn event() -> AlertEvent {
        let mut fields = BTreeMap::new();
        fields.insert("user_id".to_string(), "42".to_string());
        fields.insert("reconciliation_required".to_string(), "true".to_string());
        AlertEvent {
            level: Level::ERROR,
            timestamp: Utc::now(),
            service_name: "marketplace".to_string(),
            environment: "prod".to_string(),
            component: "backend".to_string(),
            target: "backend::usecases::subscriptions".to_string(),
            location: Some("backend/src/usecases/subscriptions.rs:10".to_string()),
            message: Some("subscriptions: local write failed after charge".to_string()),
            fields,
            span_path: vec!["request".to_string()],
        }
    }

    #[test]
    fn renders_header_message_and_fields() {
        let content = render(&event());
        assert!(content.starts_with("**marketplace** `prod` `backend` `ERROR`"));
        assert!(content.contains("> subscriptions: local write failed after charge"));
        assert!(content.contains("- `reconciliation_required` = `true`"));
        assert!(content.contains("spans: `request`"));
    }

    #[test]
    fn long_content_is_truncated() {
        let mut long = event();
        long.message = Some("x".repeat(5000));
        let content = render(&long);
        assert_eq!(content.chars().count(), CONTENT_LIMIT);
        assert!(content.ends_with(TRUNCATION_SUFFIX));
    }
}
