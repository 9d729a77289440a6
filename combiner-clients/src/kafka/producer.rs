use crate::kafka::{BINARY_CONTENT_TYPE, V2_CONTENT_TYPE, message};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use combiner_core::MessageProducer;
use combiner_core::model::QueueMessage;
use combiner_core::result::{ProduceError, ProduceResult};
use error_stack::{Report, ResultExt};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct ProduceRecord {
    value: String,
}

#[derive(Debug, Serialize)]
struct ProduceRequest {
    records: Vec<ProduceRecord>,
}

/// Publishes FT messages to one topic through a Kafka REST proxy.
#[derive(Debug, Clone)]
pub struct ProxyProducer {
    client: Client,
    topic: String,
    url: String,
}

impl ProxyProducer {
    pub fn new(client: Client, proxy_addr: &str, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            client,
            url: format!("{}/topics/{topic}", proxy_addr.trim_end_matches('/')),
            topic,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl MessageProducer for ProxyProducer {
    #[instrument(skip_all, name = "proxy_producer#send", fields(topic = %self.topic))]
    async fn send(&self, message: QueueMessage) -> ProduceResult<()> {
        let request = ProduceRequest {
            records: vec![ProduceRecord {
                value: STANDARD.encode(message::encode(&message)),
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, BINARY_CONTENT_TYPE)
            .header(ACCEPT, V2_CONTENT_TYPE)
            .json(&request)
            .send()
            .await
            .change_context(ProduceError::Request)
            .attach_with(|| self.url.clone())?;

        let status = response.status();
        if !status.is_success() {
            return Err(Report::new(ProduceError::Status(status.as_u16())).attach(self.url.clone()));
        }

        debug!("message produced");
        Ok(())
    }
}
