//! Webhook-backed plan generator (e.g. an n8n workflow).

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::types::{Plan, PlanGenerator, PlanUnavailable};
use spotplan_core::{Error, PlanGeneratorConfig, Result};

/// POSTs spot attributes to a configured endpoint and reads back a plan.
///
/// The request is bounded by the configured timeout and never retried.
pub struct WebhookPlanGenerator {
    client: Client,
    endpoint: Option<Url>,
}

impl WebhookPlanGenerator {
    pub fn new(config: &PlanGeneratorConfig) -> Result<Self> {
        let endpoint = match &config.endpoint {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|e| Error::Config(format!("invalid plan webhook URL {:?}: {}", raw, e)))?,
            ),
            None => None,
        };
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        match &endpoint {
            Some(url) => info!(
                "Plan generator: {} (timeout {}ms)",
                url,
                config.timeout.as_millis()
            ),
            None => info!("Plan generator disabled: no webhook URL configured"),
        }

        Ok(Self { client, endpoint })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[async_trait]
impl PlanGenerator for WebhookPlanGenerator {
    async fn generate(&self, attributes: &Value) -> std::result::Result<Plan, PlanUnavailable> {
        let Some(url) = &self.endpoint else {
            return Err(PlanUnavailable::NotConfigured);
        };

        debug!("Requesting plan from {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(attributes)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlanUnavailable::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.map_err(classify)?;

        parse_plan_body(content_type.as_deref(), &body)
    }
}

fn classify(e: reqwest::Error) -> PlanUnavailable {
    if e.is_timeout() {
        PlanUnavailable::Timeout
    } else {
        PlanUnavailable::Network(e.to_string())
    }
}

/// Extract plan text from a webhook response body.
///
/// Accepted shapes: `{"plan": "<text>"}`, a JSON string, or a non-JSON text
/// body taken verbatim. Anything else means there is no plan.
pub fn parse_plan_body(
    content_type: Option<&str>,
    body: &str,
) -> std::result::Result<Plan, PlanUnavailable> {
    if body.trim().is_empty() {
        return Err(PlanUnavailable::MalformedBody("empty body".into()));
    }

    let declared_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) => Ok(Plan::new(text)),
        Ok(Value::Object(map)) => match map.get("plan") {
            Some(Value::String(text)) => Ok(Plan::new(text.clone())),
            Some(_) => Err(PlanUnavailable::MalformedBody("`plan` is not a string".into())),
            None => Err(PlanUnavailable::MalformedBody("missing `plan` field".into())),
        },
        Ok(other) if declared_json => Err(PlanUnavailable::MalformedBody(format!(
            "unexpected JSON {}",
            json_kind(&other)
        ))),
        Ok(_) => Ok(Plan::new(body)),
        Err(e) if declared_json => Err(PlanUnavailable::MalformedBody(e.to_string())),
        Err(_) => Ok(Plan::new(body)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
