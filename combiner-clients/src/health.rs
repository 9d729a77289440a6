use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

const GTG_ENDPOINT: &str = "/__gtg";

#[derive(Debug, Clone)]
enum Probe {
    /// 200 from a service's good-to-go endpoint.
    GoodToGo { url: String },
    /// The proxy lists every expected topic.
    ProxyTopics { url: String, topics: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    name: String,
    severity: u8,
    business_impact: String,
    technical_summary: String,
    probe: Probe,
}

impl HealthCheck {
    pub fn good_to_go(
        name: impl Into<String>,
        base_url: &str,
        business_impact: impl Into<String>,
        technical_summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            severity: 2,
            business_impact: business_impact.into(),
            technical_summary: technical_summary.into(),
            probe: Probe::GoodToGo {
                url: format!("{}{GTG_ENDPOINT}", base_url.trim_end_matches('/')),
            },
        }
    }

    pub fn proxy_topics(
        name: impl Into<String>,
        proxy_addr: &str,
        topics: Vec<String>,
        business_impact: impl Into<String>,
        technical_summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            severity: 2,
            business_impact: business_impact.into(),
            technical_summary: technical_summary.into(),
            probe: Probe::ProxyTopics {
                url: format!("{}/topics", proxy_addr.trim_end_matches('/')),
                topics,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: String,
    pub technical_summary: String,
    pub output: String,
}

/// Runs the dependency checks behind `/__health` and `/__gtg`.
#[derive(Debug, Clone)]
pub struct HealthChecker {
    client: Client,
    checks: Vec<HealthCheck>,
}

impl HealthChecker {
    pub fn new(client: Client, checks: Vec<HealthCheck>) -> Self {
        Self { client, checks }
    }

    #[instrument(skip(self), name = "health#run_checks")]
    pub async fn run_checks(&self) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let outcome = self.probe(&check.probe).await;
            if let Err(output) = &outcome {
                error!("health check {:?} failed: {output}", check.name);
            }
            results.push(CheckResult {
                name: check.name.clone(),
                ok: outcome.is_ok(),
                severity: check.severity,
                business_impact: check.business_impact.clone(),
                technical_summary: check.technical_summary.clone(),
                output: outcome.unwrap_or_else(|e| e),
            });
        }
        results
    }

    /// Stops at the first failing check and returns its output.
    pub async fn good_to_go(&self) -> Result<(), String> {
        for check in &self.checks {
            self.probe(&check.probe).await?;
        }
        Ok(())
    }

    async fn probe(&self, probe: &Probe) -> Result<String, String> {
        match probe {
            Probe::GoodToGo { url } => {
                self.get_ok(url).await?;
                Ok("OK".to_string())
            }
            Probe::ProxyTopics { url, topics } => {
                let body = self.get_ok(url).await?;
                let available: Vec<String> = serde_json::from_str(&body)
                    .map_err(|e| format!("could not read topics from {url}: {e}"))?;
                match topics.iter().find(|t| !available.contains(t)) {
                    Some(missing) => Err(format!("topic {missing} was not found")),
                    None => Ok("Connectivity to the queue proxy is OK".to_string()),
                }
            }
        }
    }

    async fn get_ok(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?;
        if response.status() != StatusCode::OK {
            return Err(format!(
                "request to {url} failed with status {}",
                response.status().as_u16()
            ));
        }
        response
            .text()
            .await
            .map_err(|e| format!("could not read response from {url}: {e}"))
    }
}
