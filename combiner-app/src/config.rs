use apps::{AppError, AppResult};
use combiner_core::forwarder::PolicySubject;
use error_stack::Report;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONTENT_TYPES: &str = "Article,Video,MediaResource,Audio,";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub proxy_addr: String,
    pub content_topic: String,
    pub metadata_topic: String,
    pub combined_topic: String,
    pub forced_topic: String,
    pub content_group: String,
    pub metadata_group: String,
    pub document_store: Endpoint,
    pub internal_content: Endpoint,
    pub content_collection: Endpoint,
    pub opa_url: String,
    pub opa_policy_path: String,
    pub policy_subject: PolicySubject,
    pub supported_origins: Vec<String>,
    pub supported_content_uris: Vec<String>,
    pub supported_content_types: Vec<String>,
    pub http_timeout: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub endpoint: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> AppResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        Ok(Self {
            port: env.parse("APP_PORT", 8080)?,
            proxy_addr: env.string("KAFKA_PROXY_ADDR", "http://localhost:8082"),
            content_topic: env.string("KAFKA_CONTENT_TOPIC_NAME", "PostPublicationEvents"),
            metadata_topic: env.string("KAFKA_METADATA_TOPIC_NAME", "PostConceptAnnotations"),
            combined_topic: env.string(
                "KAFKA_COMBINED_TOPIC_NAME",
                "CombinedPostPublicationEvents",
            ),
            forced_topic: env.string(
                "KAFKA_FORCED_COMBINED_TOPIC_NAME",
                "ForcedCombinedPostPublicationEvents",
            ),
            content_group: env.string(
                "KAFKA_PROXY_CONTENT_CONSUMER_GROUP",
                "content-post-publication-combiner",
            ),
            metadata_group: env.string(
                "KAFKA_PROXY_METADATA_CONSUMER_GROUP",
                "metadata-post-publication-combiner",
            ),
            document_store: Endpoint {
                base_url: env.string(
                    "DOCUMENT_STORE_BASE_URL",
                    "http://localhost:8080/__document-store-api",
                ),
                endpoint: env.string("DOCUMENT_STORE_API_ENDPOINT", "/content/{uuid}"),
            },
            internal_content: Endpoint {
                base_url: env.string(
                    "INTERNAL_CONTENT_API_BASE_URL",
                    "http://localhost:8080/__internal-content-api",
                ),
                endpoint: env.string(
                    "INTERNAL_CONTENT_API_ENDPOINT",
                    "/internalcontent/{uuid}?unrollContent=true",
                ),
            },
            content_collection: Endpoint {
                base_url: env.string(
                    "CONTENT_COLLECTION_RW_BASE_URL",
                    "http://localhost:8080/__content-collection-rw-neo4j",
                ),
                endpoint: env.string(
                    "CONTENT_COLLECTION_RW_ENDPOINT",
                    "/content-collection/content-package/{uuid}",
                ),
            },
            opa_url: env.string("OPA_URL", "http://localhost:8181"),
            opa_policy_path: env.string("OPA_POLICY_PATH", "kafka/ingest_content"),
            policy_subject: env.parse("OPA_POLICY_SUBJECT", PolicySubject::Combined)?,
            supported_origins: env.list(
                "WHITELISTED_METADATA_ORIGIN_SYSTEM_HEADERS",
                "http://cmdb.ft.com/systems/pac,http://cmdb.ft.com/systems/next-video-editor",
                false,
            ),
            supported_content_uris: env.list(
                "WHITELISTED_CONTENT_URIS",
                "next-video-mapper,upp-content-validator",
                false,
            ),
            // an empty entry admits content without a type
            supported_content_types: env.list(
                "WHITELISTED_CONTENT_TYPES",
                DEFAULT_CONTENT_TYPES,
                true,
            ),
            http_timeout: Duration::from_secs(env.parse("HTTP_CLIENT_TIMEOUT_SECS", 10)?),
            poll_interval: Duration::from_secs(env.parse("KAFKA_CONSUMER_POLL_INTERVAL_SECS", 1)?),
        })
    }
}

struct Env<L>(L);

impl<L> Env<L>
where
    L: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str, default: &str) -> String {
        (self.0)(name)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &str, default: T) -> AppResult<T>
    where
        T: FromStr,
    {
        match (self.0)(name).filter(|v| !v.trim().is_empty()) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|_| {
                Report::new(AppError).attach(format!("{name} has an invalid value {raw:?}"))
            }),
        }
    }

    fn list(&self, name: &str, default: &str, keep_empty: bool) -> Vec<String> {
        let raw = (self.0)(name).unwrap_or_else(|| default.to_string());
        raw.split(',')
            .map(str::trim)
            .filter(|v| keep_empty || !v.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Endpoint {
    pub fn template(&self) -> combiner_clients::UrlTemplate {
        combiner_clients::UrlTemplate::new(&self.base_url, &self.endpoint)
    }
}
