//! WebhookAgent - HTTP transport for one chat workflow endpoint.
//!
//! Speaks the webhook protocol: `POST` for messages (JSON, or multipart
//! when files are attached), `GET` for the connectivity probe and for
//! loading a previous conversation.

use crate::codec;
use crate::config::WebhookConfig;
use crate::payload::{LOAD_PREVIOUS_SESSION_ACTION, SendMessageRequest};
use async_trait::async_trait;
use hookchat_core::error::{HookchatError, Result};
use hookchat_core::session::ChatMessage;
use hookchat_core::transport::{ChatTransport, FileAttachment, SendOutcome};
use reqwest::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// Transport implementation that talks to a webhook endpoint over HTTP.
#[derive(Clone, Debug)]
pub struct WebhookAgent {
    client: Client,
    webhook_url: String,
    config: WebhookConfig,
}

impl WebhookAgent {
    /// Creates a new agent with default timeouts.
    ///
    /// Fails fast with a configuration error when the URL is empty; no
    /// request is ever attempted without an endpoint.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        Self::with_config(webhook_url, WebhookConfig::default())
    }

    /// Creates a new agent with explicit timeouts.
    pub fn with_config(webhook_url: impl Into<String>, config: WebhookConfig) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(HookchatError::config("webhook URL is required"));
        }
        Ok(Self {
            client: Client::new(),
            webhook_url,
            config,
        })
    }

    fn build_multipart(
        payload: &SendMessageRequest<'_>,
        files: &[FileAttachment],
    ) -> Result<Form> {
        let mut form = Form::new().text("data", serde_json::to_string(payload)?);
        for (index, file) in files.iter().enumerate() {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(media_type) = &file.media_type {
                part = part.mime_str(media_type)?;
            }
            form = form.part(format!("file{index}"), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl ChatTransport for WebhookAgent {
    fn endpoint(&self) -> &str {
        &self.webhook_url
    }

    async fn send_message(
        &self,
        session_id: &str,
        chat_input: &str,
        files: &[FileAttachment],
    ) -> Result<SendOutcome> {
        let payload = SendMessageRequest::new(chat_input, session_id);

        tracing::debug!(url = %self.webhook_url, session_id, files = files.len(), "sending chat message");

        // File presence changes the transport encoding, never the payload
        // semantics: the same JSON travels in the multipart `data` field.
        let request = if files.is_empty() {
            self.client
                .post(&self.webhook_url)
                .timeout(self.config.send_timeout)
                .json(&payload)
        } else {
            self.client
                .post(&self.webhook_url)
                .timeout(self.config.send_timeout)
                .multipart(Self::build_multipart(&payload, files)?)
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(HookchatError::upstream(
                status,
                format!("Server error: {status} {body}"),
            ));
        }

        let data: Value = response.json().await?;

        if let Some(error) = data.get("error").and_then(Value::as_str) {
            return Err(HookchatError::Upstream {
                status: None,
                message: error.to_string(),
            });
        }

        let server_session_id = data
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(SendOutcome {
            message: codec::decode_reply(&data),
            session_id: server_session_id,
        })
    }

    async fn check_connectivity(&self, session_id: &str) -> Result<()> {
        // Plain GET first; a clean 2xx is enough.
        let probe = self
            .client
            .get(&self.webhook_url)
            .timeout(self.config.connect_timeout)
            .header(ACCEPT, "*/*")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await;
        match probe {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => {
                tracing::debug!(status = %response.status(), "plain GET probe not successful, trying loadPreviousSession");
            }
            Err(err) => {
                tracing::debug!("plain GET probe failed: {err}, trying loadPreviousSession");
            }
        }

        // Fallback: the loadPreviousSession action. Anything below 500
        // proves the endpoint is alive even if it rejects the action.
        let response = self
            .client
            .get(&self.webhook_url)
            .timeout(self.config.history_timeout)
            .query(&[
                ("action", LOAD_PREVIOUS_SESSION_ACTION),
                ("sessionId", session_id),
            ])
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|err| {
                HookchatError::connectivity(format!("Webhook validation failed: {err}"))
            })?;

        let status = response.status().as_u16();
        if status < 500 {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        Err(HookchatError::connectivity(format!(
            "Webhook validation failed: {status} {body}"
        )))
    }

    async fn load_previous_session(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let response = self
            .client
            .get(&self.webhook_url)
            .timeout(self.config.history_timeout)
            .query(&[
                ("action", LOAD_PREVIOUS_SESSION_ACTION),
                ("sessionId", session_id),
            ])
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "no previous session available");
            return Ok(Vec::new());
        }

        match response.json::<Value>().await {
            Ok(data) => Ok(codec::decode_history(&data)),
            Err(err) => {
                tracing::debug!("previous session response was not JSON: {err}");
                Ok(Vec::new())
            }
        }
    }
}
