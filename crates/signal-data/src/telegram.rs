//! Telegram Bot API notifier.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signal_core::error::NotifyError;
use signal_core::traits::Notifier;
use tracing::{debug, instrument, warn};

const WELCOME_MESSAGE: &str = "✅ <b>Signal desk connected</b>\n\nYou will now receive strong signal alerts in this chat.";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Identity of the bot behind a token, from `getMe`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// Sends HTML messages through the Telegram Bot API.
///
/// The bot token is read from the environment, never from config files.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: Option<String>,
    ) -> Result<Self, NotifyError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(NotifyError::NotConfigured("bot token is empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            chat_id: chat_id.filter(|id| !id.trim().is_empty()),
        })
    }

    /// Build a notifier whose token comes from the `token_env` variable.
    pub fn from_env(
        base_url: impl Into<String>,
        token_env: &str,
        chat_id: Option<String>,
    ) -> Result<Self, NotifyError> {
        let token = std::env::var(token_env)
            .map_err(|_| NotifyError::NotConfigured(format!("{token_env} is not set")))?;
        Self::new(base_url, token, chat_id)
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, NotifyError> {
        let resp = request
            .send()
            .await
            .map_err(|e| NotifyError::Network(strip_token(&e.to_string(), &self.token)))?;

        let body: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| NotifyError::Network(strip_token(&e.to_string(), &self.token)))?;

        if !body.ok {
            return Err(NotifyError::Rejected(
                body.description.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        body.result
            .ok_or_else(|| NotifyError::Rejected("response carried no result".into()))
    }

    /// Send an HTML message to a specific chat.
    #[instrument(skip(self, text), name = "telegram::send_message")]
    pub async fn send_to(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };
        let _: serde_json::Value = self
            .call(self.http.post(self.method_url("sendMessage")).json(&payload))
            .await?;
        debug!("Telegram message delivered");
        Ok(())
    }

    /// Send to the configured chat. Without a chat id this is a no-op
    /// returning `false`.
    pub async fn send_message(&self, text: &str) -> Result<bool, NotifyError> {
        match self.chat_id.as_deref() {
            Some(chat_id) => self.send_to(chat_id, text).await.map(|_| true),
            None => Ok(false),
        }
    }

    /// Check the token with `getMe`.
    pub async fn get_me(&self) -> Result<BotInfo, NotifyError> {
        self.call(self.http.get(self.method_url("getMe"))).await
    }

    /// Confirm a chat id by sending it a welcome message.
    pub async fn validate_chat(&self, chat_id: &str) -> Result<bool, NotifyError> {
        match self.send_to(chat_id, WELCOME_MESSAGE).await {
            Ok(()) => Ok(true),
            Err(NotifyError::Rejected(reason)) => {
                warn!(chat_id, reason = %reason, "Chat id rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// reqwest errors echo the URL, which embeds the token.
fn strip_token(message: &str, token: &str) -> String {
    message.replace(token, "<redacted>")
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<bool, NotifyError> {
        self.send_message(message).await
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.telegram.org";

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            TelegramNotifier::new(BASE, "  ", None),
            Err(NotifyError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_from_env_requires_variable() {
        let result = TelegramNotifier::from_env(BASE, "SIGNAL_DESK_TEST_UNSET_TOKEN", None);
        assert!(matches!(result, Err(NotifyError::NotConfigured(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let notifier = TelegramNotifier::new(BASE, "123:secret", Some("42".into())).unwrap();
        let debug = format!("{notifier:?}");

        assert!(!debug.contains("secret"));
        assert!(debug.contains("42"));
        assert_eq!(
            notifier.method_url("getMe"),
            "https://api.telegram.org/bot123:secret/getMe"
        );
        assert_eq!(
            strip_token("error sending request for url (https://x/bot123:secret/getMe)", "123:secret"),
            "error sending request for url (https://x/bot<redacted>/getMe)"
        );
    }

    #[tokio::test]
    async fn test_send_without_chat_id_is_noop() {
        let notifier = TelegramNotifier::new(BASE, "123:secret", Some(" ".into())).unwrap();

        assert_eq!(notifier.chat_id(), None);
        assert!(!notifier.send("hello").await.unwrap());
    }

    #[test]
    fn test_api_response_parsing() {
        let ok: ApiResponse<BotInfo> = serde_json::from_str(
            r#"{"ok":true,"result":{"id":7,"is_bot":true,"first_name":"Desk","username":"desk_bot"}}"#,
        )
        .unwrap();
        assert!(ok.ok);
        assert_eq!(ok.result.unwrap().username.as_deref(), Some("desk_bot"));

        let err: ApiResponse<BotInfo> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!err.ok);
        assert_eq!(err.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
