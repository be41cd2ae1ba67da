//! Delivery of finished tasks to the caller's push-notification URL.

pub mod http;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

use crate::protocol::JsonRpcResponse;

/// Posts a task envelope to a caller-supplied URL. Delivery is attempted once.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, url: &str, api_key: Option<&str>, envelope: &JsonRpcResponse) -> Result<()>;
}
