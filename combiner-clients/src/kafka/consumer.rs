use crate::kafka::{BINARY_CONTENT_TYPE, ConsumeError, ConsumeResult, V2_CONTENT_TYPE, message};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use combiner_core::model::QueueMessage;
use error_stack::{Report, ResultExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub proxy_addr: String,
    pub group: String,
    pub topic: String,
    pub offset_reset: String,
    /// Wait between empty polls, and before retrying after a proxy error.
    pub poll_interval: Duration,
}

impl ConsumerConfig {
    pub fn new(
        proxy_addr: impl Into<String>,
        group: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            proxy_addr: proxy_addr.into().trim_end_matches('/').to_string(),
            group: group.into(),
            topic: topic.into(),
            offset_reset: "latest".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[derive(Debug, Deserialize)]
struct CreatedInstance {
    instance_id: String,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    offset: i64,
}

/// Pulls FT messages for one topic from a Kafka REST proxy consumer group.
#[derive(Debug, Clone)]
pub struct ProxyConsumer {
    client: Client,
    config: ConsumerConfig,
}

impl ProxyConsumer {
    pub fn new(client: Client, config: ConsumerConfig) -> Self {
        Self { client, config }
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    /// Polls until `shutdown` flips to true or `sink` closes, then deletes the consumer instance.
    #[instrument(skip_all, name = "proxy_consumer#run", fields(topic = %self.config.topic, group = %self.config.group))]
    pub async fn run(self, sink: mpsc::Sender<QueueMessage>, mut shutdown: watch::Receiver<bool>) {
        info!("consumer started");
        let mut instance: Option<String> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let idle = match self.poll_once(&mut instance).await {
                Ok(messages) => {
                    let idle = messages.is_empty();
                    for message in messages {
                        if sink.send(message).await.is_err() {
                            warn!("message channel closed");
                            self.release(instance.take()).await;
                            return;
                        }
                    }
                    idle
                }
                Err(e) => {
                    error!("consuming from the queue proxy failed: {e:?}");
                    self.release(instance.take()).await;
                    true
                }
            };

            if idle {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }
        }

        self.release(instance.take()).await;
        info!("consumer stopped");
    }

    async fn poll_once(&self, instance: &mut Option<String>) -> ConsumeResult<Vec<QueueMessage>> {
        let instance_url = match instance {
            Some(instance_url) => instance_url.clone(),
            None => {
                let instance_url = self.create_instance().await?;
                *instance = Some(instance_url.clone());
                self.subscribe(&instance_url).await?;
                instance_url
            }
        };

        let records = self.records(&instance_url).await?;
        Ok(records.into_iter().filter_map(decode_record).collect())
    }

    async fn create_instance(&self) -> ConsumeResult<String> {
        let url = format!("{}/consumers/{}", self.config.proxy_addr, self.config.group);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, V2_CONTENT_TYPE)
            .json(&json!({
                "auto.offset.reset": self.config.offset_reset,
                "auto.commit.enable": "true",
                "format": "binary",
            }))
            .send()
            .await
            .change_context(ConsumeError::CreateInstance)
            .attach_with(|| url.clone())?;
        let response = expect_success(response, ConsumeError::CreateInstance, &url)?;

        let created: CreatedInstance = response
            .json()
            .await
            .change_context(ConsumeError::CreateInstance)?;
        debug!("created consumer instance {}", created.instance_id);
        Ok(format!("{url}/instances/{}", created.instance_id))
    }

    async fn subscribe(&self, instance_url: &str) -> ConsumeResult<()> {
        let url = format!("{instance_url}/subscription");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, V2_CONTENT_TYPE)
            .json(&json!({ "topics": [self.config.topic] }))
            .send()
            .await
            .change_context(ConsumeError::Subscribe)
            .attach_with(|| url.clone())?;
        expect_success(response, ConsumeError::Subscribe, &url)?;
        Ok(())
    }

    async fn records(&self, instance_url: &str) -> ConsumeResult<Vec<Record>> {
        let url = format!("{instance_url}/records");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, BINARY_CONTENT_TYPE)
            .send()
            .await
            .change_context(ConsumeError::Poll)
            .attach_with(|| url.clone())?;
        let response = expect_success(response, ConsumeError::Poll, &url)?;

        response.json().await.change_context(ConsumeError::Poll)
    }

    async fn release(&self, instance: Option<String>) {
        let Some(instance_url) = instance else {
            return;
        };

        let deleted = self
            .client
            .delete(&instance_url)
            .header(CONTENT_TYPE, V2_CONTENT_TYPE)
            .send()
            .await
            .change_context(ConsumeError::DeleteInstance)
            .and_then(|response| {
                expect_success(response, ConsumeError::DeleteInstance, &instance_url)
            });
        match deleted {
            Ok(_) => debug!("deleted consumer instance {instance_url}"),
            Err(e) => warn!("could not delete consumer instance: {e:?}"),
        }
    }
}

fn expect_success(response: Response, context: ConsumeError, url: &str) -> ConsumeResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Report::new(context).attach(format!("{url} responded with status {status}")))
    }
}

fn decode_record(record: Record) -> Option<QueueMessage> {
    let value = record.value?;
    let decoded = match STANDARD.decode(value.as_bytes()) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("skipping record at offset {}: {e}", record.offset);
            return None;
        }
    };
    let raw = match String::from_utf8(decoded) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("skipping record at offset {}: {e}", record.offset);
            return None;
        }
    };

    match message::decode(&raw) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("skipping record at offset {}: {e}", record.offset);
            None
        }
    }
}
