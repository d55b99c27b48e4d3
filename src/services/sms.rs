use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use crate::core::config::Settings;

#[derive(Debug, Clone)]
pub(crate) struct SmsClient {
    client: Client,
    gateway_url: String,
    api_key: String,
    sender: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    receptor: &'a str,
    sender: &'a str,
    message: String,
}

impl SmsClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build SMS HTTP client")?;

        Ok(Self {
            client,
            gateway_url: settings.sms().gateway_url.trim_end_matches('/').to_string(),
            api_key: settings.sms().api_key.clone(),
            sender: settings.sms().sender.clone(),
        })
    }

    /// Without a configured gateway the code is only logged; the local flow
    /// relies on the echoed code instead.
    pub(crate) async fn send_otp(&self, phone: &str, code: &str) -> Result<()> {
        if self.gateway_url.is_empty() {
            tracing::info!(phone = %phone, "sms gateway disabled, skipping otp delivery");
            return Ok(());
        }

        let body = SendRequest {
            receptor: phone,
            sender: &self.sender,
            message: format!("کد ورود شما: {code}"),
        };

        let response = self
            .client
            .post(&self.gateway_url)
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach SMS gateway")?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("SMS gateway returned {status}: {detail}");
        }

        Ok(())
    }
}
