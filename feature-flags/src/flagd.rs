//! flagd client speaking the HTTP/JSON flavour of the flagd evaluation API.

use async_trait::async_trait;
use cart::ports::{FlagEvaluation, FlagSource};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::{Error, Result};
use std::time::Duration;
use tracing::debug;

const RESOLVE_OBJECT_PATH: &str = "/flagd.evaluation.v1.Service/ResolveObject";

/// HTTP client for object-flag evaluation against a flagd instance.
#[derive(Debug, Clone)]
pub struct FlagdClient {
    base_url: String,
    http: Client,
}

impl FlagdClient {
    /// Create a client for `base_url` (e.g. `"http://localhost:8013"`).
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::FlagEvaluation(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn resolve_url(&self) -> String {
        format!("{}{}", self.base_url, RESOLVE_OBJECT_PATH)
    }
}

/// `{"flagKey": .., "context": {"targetingKey": .., <attributes>}}`
fn request_body(evaluation: &FlagEvaluation) -> Value {
    let mut context = Map::new();
    context.insert(
        "targetingKey".to_string(),
        Value::String(evaluation.targeting_key.clone()),
    );
    for (name, value) in &evaluation.attributes {
        context.insert(name.clone(), Value::String(value.clone()));
    }

    serde_json::json!({
        "flagKey": evaluation.flag_key,
        "context": context,
    })
}

#[derive(Debug, Deserialize)]
struct ResolveObjectResponse {
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    variant: Option<String>,
}

#[async_trait]
impl FlagSource for FlagdClient {
    async fn resolve_object(&self, evaluation: FlagEvaluation) -> Result<Option<Value>> {
        let response = self
            .http
            .post(self.resolve_url())
            .json(&request_body(&evaluation))
            .send()
            .await
            .map_err(|e| Error::FlagEvaluation(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Flag {} not defined in flagd", evaluation.flag_key);
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::FlagEvaluation(format!(
                "resolve {} failed with status {status}: {text}",
                evaluation.flag_key
            )));
        }

        let parsed: ResolveObjectResponse = response
            .json()
            .await
            .map_err(|e| Error::FlagEvaluation(e.to_string()))?;

        debug!(
            "Flag {} resolved for {}: variant={:?} reason={:?}",
            evaluation.flag_key, evaluation.targeting_key, parsed.variant, parsed.reason
        );
        Ok(parsed.value)
    }
}
