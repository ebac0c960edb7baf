use serde_json::json;

use crate::config::AppConfig;

/// Outbound mail as a plain HTTP call to a relay endpoint. Delivery is
/// best-effort: failures are logged, never surfaced to the caller.
pub struct MailService {
    client: reqwest::Client,
    relay_url: Option<String>,
    sender: String,
}

impl MailService {
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            relay_url: config.mail_relay_url.clone(),
            sender: config.mail_sender.clone(),
        }
    }

    pub async fn send(&self, recipients: &[String], subject: &str, body: &str) {
        let Some(url) = &self.relay_url else {
            tracing::debug!("Mail relay not configured, skipping \"{}\"", subject);
            return;
        };

        let payload = json!({
            "from": self.sender,
            "to": recipients,
            "subject": subject,
            "body": body,
        });

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(
                    "Mail relay rejected \"{}\" with status {}",
                    subject,
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to deliver \"{}\": {}", subject, e);
            }
        }
    }
}
