use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use tracing::info;

use crate::consts::{WEBHOOK_API_KEY_HEADER, WEBHOOK_TIMEOUT};
use crate::protocol::JsonRpcResponse;

use super::Notifier;

/// Delivers envelopes with a plain HTTP POST.
pub struct HttpNotifier {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: WEBHOOK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn deliver(&self, url: &str, api_key: Option<&str>, envelope: &JsonRpcResponse) -> Result<()> {
        let mut req = self.client.post(url).timeout(self.timeout);
        if let Some(key) = api_key {
            req = req.header(WEBHOOK_API_KEY_HEADER, key);
        }

        let resp = req
            .json(envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("webhook {url} did not answer within {:?}", self.timeout)
                } else {
                    anyhow::Error::new(e).context(format!("webhook POST to {url} failed"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("webhook {url} answered {status}: {body}");
        }

        info!(url, status = status.as_u16(), "webhook delivered");
        Ok(())
    }
}
