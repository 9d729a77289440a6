use combiner_core::PolicyEvaluator;
use combiner_core::model::PolicyDecision;
use combiner_core::result::{PolicyError, PolicyResult};
use error_stack::{Report, ResultExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct Query {
    input: Value,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    decision_id: Option<String>,
    #[serde(default)]
    result: Option<PolicyDecision>,
}

/// Evaluates publication policies through an Open Policy Agent data API.
#[derive(Debug, Clone)]
pub struct OpaClient {
    client: Client,
    url: String,
}

impl OpaClient {
    pub fn new(client: Client, opa_url: &str, policy_path: &str) -> Self {
        Self {
            client,
            url: format!(
                "{}/v1/data/{}",
                opa_url.trim_end_matches('/'),
                policy_path.trim_matches('/')
            ),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PolicyEvaluator for OpaClient {
    #[instrument(skip_all, name = "opa_client#evaluate")]
    async fn evaluate(&self, input: Value) -> PolicyResult<PolicyDecision> {
        let response = self
            .client
            .post(&self.url)
            .json(&Query { input })
            .send()
            .await
            .change_context(PolicyError::Request)
            .attach_with(|| self.url.clone())?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Report::new(PolicyError::Status(status.as_u16())).attach(self.url.clone()));
        }

        let response: QueryResponse = response.json().await.change_context(PolicyError::Parse)?;
        let decision = response.result.unwrap_or_default();
        debug!(
            decision_id = response.decision_id.as_deref().unwrap_or_default(),
            skip = decision.skip,
            "evaluated content policy"
        );
        Ok(decision)
    }
}
