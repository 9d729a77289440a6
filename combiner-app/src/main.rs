use apps::{AppError, AppProperties, AppResult};
use combiner_clients::kafka::{ConsumerConfig, ProxyConsumer, ProxyProducer};
use combiner_clients::{ContentClient, HealthCheck, HealthChecker, InternalContentClient, OpaClient};
use combiner_core::combiner::DataCombiner;
use combiner_core::forwarder::FilteringForwarder;
use combiner_core::publisher::OnDemandPublisher;
use combiner_core::router::{MessageRouter, RouterConfig};
use combiner_routes::state::CombinerAppState;
use config::Config;
use dotenv::dotenv;
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

const INBOUND_BUFFER: usize = 100;

type Combined = DataCombiner<ContentClient, ContentClient, InternalContentClient>;
type Forwarding = FilteringForwarder<ProxyProducer, OpaClient>;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("post publication combiner shutting down"),
        Err(e) => {
            error!("post publication combiner exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_env("COMBINER_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn try_main() -> AppResult<()> {
    let loaded = dotenv();
    init_logging();
    if let Err(e) = loaded {
        warn!("failed to load .env file: {e}");
    }

    let config = Config::from_env()?;
    debug!("loaded configuration: {config:?}");

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .change_context(AppError)
        .attach("could not build the http client")?;

    let combiner = build_combiner(&client, &config);

    let (stop, shutdown) = watch::channel(false);
    let (sender, receiver) = mpsc::channel(INBOUND_BUFFER);

    let router = MessageRouter::new(
        combiner.clone(),
        build_forwarder(&client, &config, &config.combined_topic),
        RouterConfig {
            supported_content_uris: config.supported_content_uris.clone(),
            supported_origins: config.supported_origins.clone(),
        },
    );
    let router_task = tokio::spawn(async move { router.run(ReceiverStream::new(receiver)).await });

    let consumers = [
        (&config.content_group, &config.content_topic),
        (&config.metadata_group, &config.metadata_topic),
    ]
    .into_iter()
    .map(|(group, topic)| {
        let consumer = ProxyConsumer::new(
            client.clone(),
            ConsumerConfig::new(&config.proxy_addr, group, topic)
                .with_poll_interval(config.poll_interval),
        );
        tokio::spawn(consumer.run(sender.clone(), shutdown.clone()))
    })
    .collect::<Vec<_>>();
    // the channel closes once every consumer has stopped
    drop(sender);

    let publisher = OnDemandPublisher::new(
        combiner,
        build_forwarder(&client, &config, &config.forced_topic),
    );
    let state = CombinerAppState::new_with_metrics(publisher, build_health(&client, &config));
    let routes = combiner_routes::routes::build(state);

    let served = apps::run(
        routes,
        AppProperties { port: config.port },
        apps::shutdown_signal(),
    )
    .await;

    info!("stopping consumers");
    if stop.send(true).is_err() {
        warn!("every consumer had already stopped");
    }
    for consumer in consumers {
        if let Err(e) = consumer.await {
            error!("consumer task failed: {e}");
        }
    }
    if let Err(e) = router_task.await {
        error!("router task failed: {e}");
    }

    served
}

fn build_combiner(client: &reqwest::Client, config: &Config) -> Combined {
    DataCombiner::new(
        ContentClient::new(client.clone(), config.document_store.template()),
        ContentClient::new(client.clone(), config.content_collection.template()),
        InternalContentClient::new(client.clone(), config.internal_content.template()),
    )
}

fn build_forwarder(client: &reqwest::Client, config: &Config, topic: &str) -> Forwarding {
    FilteringForwarder::new(
        ProxyProducer::new(client.clone(), &config.proxy_addr, topic),
        OpaClient::new(client.clone(), &config.opa_url, &config.opa_policy_path),
        config.supported_content_types.clone(),
        config.policy_subject,
    )
}

fn build_health(client: &reqwest::Client, config: &Config) -> HealthChecker {
    HealthChecker::new(
        client.clone(),
        vec![
            HealthCheck::good_to_go(
                "Check connectivity to document-store-api",
                &config.document_store.base_url,
                "CombinedPostPublication messages can't be constructed.",
                "Document-store-api is not reachable. Messages can't be successfully constructed, neither forwarded.",
            ),
            HealthCheck::good_to_go(
                "Check connectivity to internal-content-api",
                &config.internal_content.base_url,
                "CombinedPostPublication messages can't be constructed.",
                "Internal-content-api is not reachable. Messages can't be successfully constructed, neither forwarded.",
            ),
            HealthCheck::proxy_topics(
                "Check kafka-proxy connectivity and consumed topics",
                &config.proxy_addr,
                vec![config.content_topic.clone(), config.metadata_topic.clone()],
                "CombinedPostPublication messages can't be forwarded to the queue.",
                "Messages couldn't be read from the queue. Check kafka-proxy and the consumed topics.",
            ),
            HealthCheck::proxy_topics(
                "Check kafka-proxy connectivity and produced topics",
                &config.proxy_addr,
                vec![config.combined_topic.clone(), config.forced_topic.clone()],
                "CombinedPostPublication messages can't be forwarded to the queue.",
                "Messages couldn't be forwarded to the queue. Check kafka-proxy and the produced topics.",
            ),
        ],
    )
}
