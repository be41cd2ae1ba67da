use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::protocol::JsonRpcResponse;

use super::Notifier;

/// One captured delivery.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub url: String,
    pub api_key: Option<String>,
    pub envelope: JsonRpcResponse,
}

/// A notifier for tests. Records every delivery and wakes waiters.
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    notify: Notify,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records deliveries but reports each one as failed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    /// Wait until at least `n` deliveries have been recorded.
    pub async fn wait_for(&self, n: usize) -> Vec<Delivery> {
        loop {
            let notified = self.notify.notified();
            {
                let deliveries = self.deliveries.lock().unwrap();
                if deliveries.len() >= n {
                    return deliveries.clone();
                }
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, url: &str, api_key: Option<&str>, envelope: &JsonRpcResponse) -> Result<()> {
        self.deliveries.lock().unwrap().push(Delivery {
            url: url.to_string(),
            api_key: api_key.map(str::to_string),
            envelope: envelope.clone(),
        });
        self.notify.notify_waiters();
        if self.fail {
            bail!("scripted delivery failure");
        }
        Ok(())
    }
}
