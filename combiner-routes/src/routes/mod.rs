use crate::error::EndpointError;
use crate::metrics;
use crate::service::PublishService;
use crate::state::CombinerAppState;
use axum::middleware;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response, Result},
    routing::{get, post},
};
use combiner_clients::HealthChecker;
use combiner_core::ForcePublisher;
use combiner_core::headers::TRANSACTION_ID;
use responses::{HealthCheckResponse, HealthResponse};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub mod responses;

const SERVICE_NAME: &str = "post-publication-combiner";
const SERVICE_DESCRIPTION: &str = "Checks for service dependencies: document-store, internal-content-api, kafka proxy and the presence of related topics";

const FORCE_PUBLISH_PATH: &str = "/{id}";
const HEALTH_PATH: &str = "/__health";
const GTG_PATH: &str = "/__gtg";
const PING_PATH: &str = "/__ping";
const METRICS_PATH: &str = "/metrics";

#[derive(OpenApi)]
#[openapi(
    paths(force_publish, health, good_to_go, ping),
    components(schemas(HealthResponse, HealthCheckResponse))
)]
struct ApiDoc;

pub fn build<P: ForcePublisher>(app_state: CombinerAppState<P>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router.merge(SwaggerUi::new("/__api/swagger-ui").url("/__api/openapi.json", api))
}

fn routes<S, P: ForcePublisher>(app_state: CombinerAppState<P>) -> OpenApiRouter<S> {
    let main_router = OpenApiRouter::new()
        .route(FORCE_PUBLISH_PATH, post(force_publish::<P>))
        .route(HEALTH_PATH, get(health))
        .route(GTG_PATH, get(good_to_go))
        .route(PING_PATH, get(ping));

    let recorder = if app_state.metrics_enabled {
        metrics::setup_recorder()
    } else {
        None
    };

    let router = match recorder {
        Some(metrics_recorder) => {
            info!("metrics enabled, setting up metrics handler");
            main_router
                .route(
                    METRICS_PATH,
                    get(|| async move { metrics_recorder.render() }),
                )
                .route_layer(middleware::from_fn(metrics::track_http))
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            main_router.route(
                METRICS_PATH,
                get(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
                    )
                }),
            )
        }
    };

    router.with_state(app_state)
}

/// Combine, filter and publish the content with the given id.
#[utoipa::path(
    post,
    path = FORCE_PUBLISH_PATH,
    responses(
        (status = OK, description = "The combined message was published"),
        (status = BAD_REQUEST, description = "The id is not a valid UUID"),
        (status = NOT_FOUND, description = "Neither content nor metadata exist for the id"),
        (status = UNPROCESSABLE_ENTITY, description = "The content type is not published by this service"),
        (status = INTERNAL_SERVER_ERROR, description = "Fetching, policy evaluation or sending failed"),
    ),
    params(
        ("id" = String, Path, description = "UUID of the content to publish"),
        ("X-Request-Id" = Option<String>, Header, description = "Transaction id, generated when missing"),
    )
)]
#[instrument(skip(service, headers), err(Debug))]
async fn force_publish<P: ForcePublisher>(
    State(service): State<PublishService<P>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, EndpointError> {
    if Uuid::parse_str(&id).is_err() {
        error!("invalid UUID");
        return Ok((StatusCode::BAD_REQUEST, format!("invalid uuid {id}")).into_response());
    }

    let tid = headers
        .get(TRANSACTION_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    service.force_publish(&id, tid).await?;
    Ok(StatusCode::OK.into_response())
}

/// Report the state of every dependency.
#[utoipa::path(
    get,
    path = HEALTH_PATH,
    responses(
        (status = OK, description = "The outcome of every dependency check", body = HealthResponse),
    )
)]
async fn health(State(health): State<Arc<HealthChecker>>) -> Json<HealthResponse> {
    let results = health.run_checks().await;
    Json(HealthResponse::new(SERVICE_NAME, SERVICE_DESCRIPTION, results))
}

#[utoipa::path(
    get,
    path = GTG_PATH,
    responses(
        (status = OK, description = "Every dependency is reachable"),
        (status = SERVICE_UNAVAILABLE, description = "A dependency is unreachable"),
    )
)]
async fn good_to_go(State(health): State<Arc<HealthChecker>>) -> Response {
    match health.good_to_go().await {
        Ok(()) => (StatusCode::OK, "OK".to_string()).into_response(),
        Err(output) => (StatusCode::SERVICE_UNAVAILABLE, output).into_response(),
    }
}

#[utoipa::path(get, path = PING_PATH, responses((status = OK, description = "pong")))]
async fn ping() -> &'static str {
    "pong"
}

#[cfg(test)]
mod tests;
