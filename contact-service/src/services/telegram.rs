//! Best-effort delivery of contact notifications through the Telegram Bot API.
//!
//! Every configured chat gets one `sendMessage` call, in order. A failure for
//! one chat is logged and recorded in the [`DispatchReport`]; it never stops
//! delivery to the chats after it. Nothing is retried.

use crate::config::TelegramConfig;
use crate::models::ContactSubmission;
use metrics::counter;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

const PARSE_MODE: &str = "HTML";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Telegram API returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug)]
pub struct RecipientOutcome {
    pub chat_id: String,
    pub result: Result<(), DeliveryError>,
}

/// Result of one dispatch across all configured chats.
#[derive(Debug, Default)]
pub struct DispatchReport {
    attempted: bool,
    outcomes: Vec<RecipientOutcome>,
}

impl DispatchReport {
    pub fn not_attempted() -> Self {
        Self::default()
    }

    pub fn attempted(&self) -> bool {
        self.attempted
    }

    pub fn outcomes(&self) -> &[RecipientOutcome] {
        &self.outcomes
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    /// True only if dispatch ran and every attempted chat accepted the message.
    pub fn is_success(&self) -> bool {
        self.attempted && self.failed() == 0
    }
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.bot_token.is_some()
    }

    pub fn chat_ids(&self) -> &[String] {
        &self.config.chat_ids
    }

    /// Send `text` to every configured chat.
    pub async fn dispatch(&self, text: &str) -> DispatchReport {
        let Some(token) = self.config.bot_token.as_ref() else {
            tracing::error!("Telegram bot token not configured");
            return DispatchReport::not_attempted();
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url.trim_end_matches('/'),
            token.expose_secret()
        );

        let mut outcomes = Vec::with_capacity(self.config.chat_ids.len());
        for chat_id in &self.config.chat_ids {
            let chat_id = chat_id.trim();
            if chat_id.is_empty() {
                continue;
            }

            let result = self.send_to(&url, chat_id, text).await;
            match &result {
                Ok(()) => {
                    counter!("telegram_messages_total", "status" => "sent").increment(1);
                    tracing::info!(chat_id = %chat_id, "Telegram message sent");
                }
                Err(e) => {
                    counter!("telegram_messages_total", "status" => "failed").increment(1);
                    tracing::error!(
                        chat_id = %chat_id,
                        error = %e,
                        "Failed to send Telegram message"
                    );
                }
            }

            outcomes.push(RecipientOutcome {
                chat_id: chat_id.to_string(),
                result,
            });
        }

        DispatchReport {
            attempted: true,
            outcomes,
        }
    }

    async fn send_to(&self, url: &str, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode: PARSE_MODE,
            })
            .send()
            .await
            // The URL carries the bot token.
            .map_err(|e| DeliveryError::Connection(e.without_url().to_string()))?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        Ok(())
    }
}

/// Render the notification for a new contact submission.
pub fn format_contact_message(contact: &ContactSubmission) -> String {
    let message = contact
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "—".to_string());

    format!(
        "🏋️ <b>Нова заявка з сайту!</b>\n\
         \n\
         👤 <b>Ім'я:</b> {}\n\
         📞 <b>Телефон:</b> {}\n\
         💬 <b>Повідомлення:</b> {}\n\
         \n\
         🕐 <b>Час:</b> {} UTC",
        escape_html(&contact.name),
        escape_html(&contact.phone),
        message,
        contact.timestamp.format("%d.%m.%Y %H:%M"),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use secrecy::Secret;

    fn contact(message: Option<&str>) -> ContactSubmission {
        ContactSubmission {
            id: "id-1".to_string(),
            name: "Alice <admin>".to_string(),
            phone: "+380 67 000 0000".to_string(),
            message: message.map(str::to_string),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 9, 7, 5, 0).unwrap(),
        }
    }

    #[test]
    fn message_contains_fields_and_time() {
        let text = format_contact_message(&contact(Some("Call me & soon")));
        assert!(text.contains("Alice &lt;admin&gt;"));
        assert!(text.contains("+380 67 000 0000"));
        assert!(text.contains("Call me &amp; soon"));
        assert!(text.contains("09.06.2025 07:05 UTC"));
        assert!(!text.starts_with('\n'));
    }

    #[test]
    fn absent_message_renders_dash() {
        let text = format_contact_message(&contact(None));
        assert!(text.contains("<b>Повідомлення:</b> —"));
    }

    #[test]
    fn report_success_rules() {
        assert!(!DispatchReport::not_attempted().is_success());

        let report = DispatchReport {
            attempted: true,
            outcomes: vec![
                RecipientOutcome {
                    chat_id: "1".to_string(),
                    result: Ok(()),
                },
                RecipientOutcome {
                    chat_id: "2".to_string(),
                    result: Err(DeliveryError::Connection("refused".to_string())),
                },
            ],
        };
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn missing_token_skips_dispatch() {
        let notifier = TelegramNotifier::new(TelegramConfig {
            bot_token: None,
            chat_ids: vec!["1".to_string()],
            // Nothing listens here; a request would fail the outcome list.
            api_base_url: "http://127.0.0.1:9".to_string(),
        });
        let report = notifier.dispatch("hello").await;
        assert!(!report.attempted());
        assert!(report.outcomes().is_empty());
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn unreachable_api_records_every_chat() {
        let notifier = TelegramNotifier::new(TelegramConfig {
            bot_token: Some(Secret::new("token".to_string())),
            chat_ids: vec!["1".to_string(), " ".to_string(), "2".to_string()],
            api_base_url: "http://127.0.0.1:9".to_string(),
        });
        let report = notifier.dispatch("hello").await;
        assert!(report.attempted());
        assert_eq!(report.failed(), 2);
        assert!(report
            .outcomes()
            .iter()
            .all(|o| matches!(o.result, Err(DeliveryError::Connection(_)))));
    }
}
