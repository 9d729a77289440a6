use combiner_clients::CheckResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub name: String,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: String,
    pub technical_summary: String,
    pub output: String,
}

impl From<CheckResult> for HealthCheckResponse {
    fn from(value: CheckResult) -> Self {
        Self {
            name: value.name,
            ok: value.ok,
            severity: value.severity,
            business_impact: value.business_impact,
            technical_summary: value.technical_summary,
            output: value.output,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub name: String,
    pub description: String,
    pub ok: bool,
    pub checks: Vec<HealthCheckResponse>,
}

impl HealthResponse {
    pub fn new(name: &str, description: &str, results: Vec<CheckResult>) -> Self {
        let checks: Vec<HealthCheckResponse> = results.into_iter().map(Into::into).collect();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ok: checks.iter().all(|c| c.ok),
            checks,
        }
    }
}
