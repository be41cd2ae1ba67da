//! Inbound `tasks/send` payload.
//!
//! Every field is optional; intake reports missing data as a validation
//! error rather than a decode error.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::RequestId;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendTaskRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: SendTaskParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendTaskParams {
    #[serde(default)]
    pub message: IncomingMessage,
    #[serde(default)]
    pub configuration: Option<TaskConfiguration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<IncomingPart>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl IncomingMessage {
    fn metadata_str(&self, key: &str) -> Option<String> {
        match self.metadata.as_ref()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.metadata_str("telex_user_id")
    }

    pub fn org_id(&self) -> Option<String> {
        self.metadata_str("org_id")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingPart {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfiguration {
    #[serde(default)]
    pub push_notification_config: Option<PushNotificationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushNotificationConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub authentication: Option<AuthenticationInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthenticationInfo {
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default)]
    pub credentials: Option<String>,
}

impl SendTaskRequest {
    pub fn push_config(&self) -> Option<&PushNotificationConfig> {
        self.params
            .configuration
            .as_ref()?
            .push_notification_config
            .as_ref()
    }

    /// Credentials supplied by the caller, ignoring blank values.
    pub fn credentials(&self) -> Option<&str> {
        self.push_config()?
            .authentication
            .as_ref()?
            .credentials
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}
