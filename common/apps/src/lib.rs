use axum::Router;
use axum::response::Response;
use error_stack::{Report, ResultExt};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, warn};

pub struct AppProperties {
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
#[error("the app exited with an error")]
pub struct AppError;

pub type AppResult<T> = Result<T, Report<AppError>>;

/// Serves `routes` on all interfaces until `shutdown` resolves.
pub async fn run<F>(routes: Router, properties: AppProperties, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = build_listener(properties.port).await?;

    let routes = routes.layer(ServiceBuilder::new().layer(
        TraceLayer::new_for_http().on_response(|res: &Response, latency: Duration, _span: &Span| {
            info!("returned {} in {}ms", res.status(), latency.as_millis());
        }),
    ));

    info!(
        "starting up combiner service on port {}",
        listener.local_addr().change_context(AppError)?.port()
    );

    axum::serve(listener, routes)
        .with_graceful_shutdown(shutdown)
        .await
        .change_context(AppError)
}

async fn build_listener(port: u16) -> AppResult<TcpListener> {
    TcpListener::bind(std::net::SocketAddr::V4(SocketAddrV4::new(
        Ipv4Addr::UNSPECIFIED,
        port,
    )))
    .await
    .change_context(AppError)
    .attach_with(|| format!("port {port}"))
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
