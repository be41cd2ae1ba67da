//! `GET /.well-known/agent.json`: the capability descriptor.
//!
//! The card is static except for its URLs, which are rebuilt per request from
//! the `Host` the caller used plus an optional `x-external-base-url` suffix
//! (set by proxies that mount the agent under a path).

use axum::Json;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::consts::VERSION;

pub const EXTERNAL_BASE_HEADER: &str = "x-external-base-url";
const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub provider: AgentProvider,
    pub version: String,
    pub documentation_url: String,
    pub capabilities: AgentCapabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProvider {
    pub organization: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub input_modes: Vec<String>,
    pub output_modes: Vec<String>,
    pub examples: Vec<Value>,
}

impl AgentCard {
    /// The card with every URL pointing at `base_url`.
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            name: "Lead research Agent".to_string(),
            description: "Finds business leads: turns a plain-language request into targeted \
                          web searches and sends back a list of matching sites."
                .to_string(),
            url: base.to_string(),
            provider: AgentProvider {
                organization: "Telex Org.".to_string(),
                url: base.to_string(),
            },
            version: VERSION.to_string(),
            documentation_url: format!("{base}/docs"),
            capabilities: AgentCapabilities {
                streaming: false,
                push_notifications: true,
            },
            default_input_modes: vec!["text/plain".to_string()],
            default_output_modes: vec!["text/plain".to_string()],
            skills: vec![AgentSkill {
                id: "lead_research".to_string(),
                name: "Lead research".to_string(),
                description: "Searches the web for companies matching a description and \
                              returns them as a numbered list of links."
                    .to_string(),
                input_modes: vec!["text".to_string()],
                output_modes: vec!["text".to_string()],
                examples: vec![json!({
                    "input": {"parts": [{"text": "private hospitals in Abuja", "contentType": "text/plain"}]},
                    "output": {"parts": [{"text": "1. [Example Hospital](https://hospital.example)", "contentType": "text/plain"}]}
                })],
            }],
        }
    }
}

/// `{scheme}://{host}` as seen by the caller, plus the external suffix.
pub fn base_url(headers: &HeaderMap) -> String {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let scheme = header(FORWARDED_PROTO_HEADER)
        .map(|p| p.split(',').next().unwrap_or(p).trim())
        .filter(|p| !p.is_empty())
        .unwrap_or("http");
    let host = header(HOST.as_str()).unwrap_or("localhost");
    let external = header(EXTERNAL_BASE_HEADER).unwrap_or("");

    format!("{scheme}://{}{}", host.trim_end_matches('/'), external)
}

pub async fn agent_card(headers: HeaderMap) -> Json<AgentCard> {
    Json(AgentCard::for_base_url(&base_url(&headers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn base_url_from_host() {
        assert_eq!(
            base_url(&headers(&[("host", "agent.example:4000")])),
            "http://agent.example:4000"
        );
    }

    #[test]
    fn base_url_appends_external_suffix() {
        let h = headers(&[("host", "agent.example"), (EXTERNAL_BASE_HEADER, "/agents/leads")]);
        assert_eq!(base_url(&h), "http://agent.example/agents/leads");
    }

    #[test]
    fn base_url_honours_forwarded_proto() {
        let h = headers(&[("host", "agent.example"), ("x-forwarded-proto", "https, http")]);
        assert_eq!(base_url(&h), "https://agent.example");
    }

    #[test]
    fn base_url_without_host() {
        assert_eq!(base_url(&HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn card_urls_follow_base() {
        let card = AgentCard::for_base_url("https://agent.example/leads/");
        assert_eq!(card.url, "https://agent.example/leads");
        assert_eq!(card.provider.url, "https://agent.example/leads");
        assert_eq!(card.documentation_url, "https://agent.example/leads/docs");
        assert!(card.capabilities.push_notifications);
    }

    #[test]
    fn card_serializes_camel_case() {
        let value = serde_json::to_value(AgentCard::for_base_url("http://a")).unwrap();
        assert_eq!(value["documentationUrl"], "http://a/docs");
        assert_eq!(value["capabilities"]["pushNotifications"], true);
        assert_eq!(value["defaultInputModes"][0], "text/plain");
        assert_eq!(value["skills"][0]["inputModes"][0], "text");
        assert_eq!(value["version"], VERSION);
    }
}
