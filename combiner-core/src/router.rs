use crate::headers::{ANNOTATIONS_MESSAGE_TYPE, MESSAGE_TYPE, ORIGIN_SYSTEM_ID};
use crate::metrics;
use crate::model::{AnnotationsMessage, CombinedModel, ContentMessage, Headers, QueueMessage};
use crate::result::ForwardError;
use crate::tid::TidGenerator;
use crate::{Combiner, Forwarder};
use tokio_stream::{Stream, StreamExt};
use tracing::field::Empty;
use tracing::{Instrument, Span, error, info, info_span};

#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    /// Substrings a content message's `contentUri` must contain one of.
    pub supported_content_uris: Vec<String>,
    /// Substrings an annotations message's `Origin-System-Id` must contain one of.
    pub supported_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    UnsupportedContentUri,
    MissingUuid,
    UnsupportedOrigin,
    CombineFailed,
    ContentNotFound,
    InvalidContentType,
    PolicySkip,
    ForwardFailed,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Malformed => "malformed",
            DropReason::UnsupportedContentUri => "unsupported_content_uri",
            DropReason::MissingUuid => "missing_uuid",
            DropReason::UnsupportedOrigin => "unsupported_origin",
            DropReason::CombineFailed => "combine_failed",
            DropReason::ContentNotFound => "content_not_found",
            DropReason::InvalidContentType => "invalid_content_type",
            DropReason::PolicySkip => "policy_skip",
            DropReason::ForwardFailed => "forward_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forwarded,
    Dropped(DropReason),
}

/// Drives inbound queue messages through combine and forward, one at a time.
#[derive(Debug)]
pub struct MessageRouter<C, F> {
    combiner: C,
    forwarder: F,
    config: RouterConfig,
    tids: TidGenerator,
}

impl<C, F> MessageRouter<C, F>
where
    C: Combiner,
    F: Forwarder,
{
    pub fn new(combiner: C, forwarder: F, config: RouterConfig) -> Self {
        Self {
            combiner,
            forwarder,
            config,
            tids: TidGenerator::default(),
        }
    }

    pub fn with_tids(mut self, tids: TidGenerator) -> Self {
        self.tids = tids;
        self
    }

    /// Consumes `messages` until the stream ends.
    pub async fn run<S>(&self, mut messages: S)
    where
        S: Stream<Item = QueueMessage> + Unpin,
    {
        info!("message router started");
        while let Some(message) = messages.next().await {
            self.process(message).await;
        }
        info!("inbound stream closed, message router stopped");
    }

    pub async fn process(&self, mut message: QueueMessage) -> Outcome {
        let tid = self.tids.ensure(&mut message.headers);
        let span = info_span!(
            "router#process",
            transaction_id = %tid,
            uuid = Empty,
            content_uri = Empty
        );

        let outcome = async {
            if message.header(MESSAGE_TYPE) == ANNOTATIONS_MESSAGE_TYPE {
                self.process_metadata(message).await
            } else {
                self.process_content(message).await
            }
        }
        .instrument(span)
        .await;

        match outcome {
            Outcome::Forwarded => metrics::increment_forwarded(),
            Outcome::Dropped(reason) => metrics::increment_dropped(reason.as_str()),
        }
        outcome
    }

    async fn process_content(&self, message: QueueMessage) -> Outcome {
        let envelope: ContentMessage = match serde_json::from_str(&message.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("could not unmarshal content message: {e}");
                return Outcome::Dropped(DropReason::Malformed);
            }
        };
        Span::current().record("content_uri", envelope.content_uri.as_str());

        if !contains_substring_of(&self.config.supported_content_uris, &envelope.content_uri) {
            info!(
                "skipped unsupported content with contentUri {}",
                envelope.content_uri
            );
            return Outcome::Dropped(DropReason::UnsupportedContentUri);
        }

        let uuid = envelope.content.uuid().to_string();
        if uuid.is_empty() {
            error!(
                "UUID not found after message unmarshalling, skipping message with contentUri {}",
                envelope.content_uri
            );
            return Outcome::Dropped(DropReason::MissingUuid);
        }
        Span::current().record("uuid", uuid.as_str());

        let combined = if envelope.content.is_deleted() {
            CombinedModel::deleted(uuid, envelope.content_uri, envelope.last_modified)
        } else {
            match self.combiner.for_content(envelope.content).await {
                Ok(mut combined) => {
                    combined.content_uri = envelope.content_uri;
                    combined
                }
                Err(e) => {
                    error!("error obtaining the combined message, it will be skipped: {e:?}");
                    return Outcome::Dropped(DropReason::CombineFailed);
                }
            }
        };

        self.forward(message.headers, combined).await
    }

    async fn process_metadata(&self, message: QueueMessage) -> Outcome {
        let origin = message.header(ORIGIN_SYSTEM_ID);
        if !contains_substring_of(&self.config.supported_origins, origin) {
            info!("skipped unsupported annotations with Origin-System-Id {origin:?}");
            return Outcome::Dropped(DropReason::UnsupportedOrigin);
        }

        let envelope: AnnotationsMessage = match serde_json::from_str(&message.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("could not unmarshal annotations message: {e}");
                return Outcome::Dropped(DropReason::Malformed);
            }
        };
        Span::current().record("content_uri", envelope.content_uri.as_str());
        Span::current().record("uuid", envelope.content_uuid());

        let combined = match self.combiner.for_annotations(envelope).await {
            Ok(combined) => combined,
            Err(e) => {
                error!("error obtaining the combined message, it will be skipped: {e:?}");
                return Outcome::Dropped(DropReason::CombineFailed);
            }
        };

        if combined.content_uuid().is_empty() {
            info!("could not find content for the annotations, message will be skipped");
            return Outcome::Dropped(DropReason::ContentNotFound);
        }

        self.forward(message.headers, combined).await
    }

    async fn forward(&self, mut headers: Headers, combined: CombinedModel) -> Outcome {
        match self
            .forwarder
            .filter_and_forward(&mut headers, &combined)
            .await
        {
            Ok(()) => {
                info!("mapped and sent message for uuid {}", combined.uuid);
                Outcome::Forwarded
            }
            Err(e) => {
                let reason = match e.current_context() {
                    ForwardError::InvalidContentType(content_type) => {
                        info!("skipped unsupported content with type {content_type:?}");
                        return Outcome::Dropped(DropReason::InvalidContentType);
                    }
                    ForwardError::PolicySkip(reasons) => {
                        info!("skipped by publication policy: {reasons}");
                        return Outcome::Dropped(DropReason::PolicySkip);
                    }
                    _ => DropReason::ForwardFailed,
                };
                error!("error sending combined message to queue: {e:?}");
                Outcome::Dropped(reason)
            }
        }
    }
}

/// True when `element` contains any entry of `allowed` as a substring.
pub fn contains_substring_of(allowed: &[String], element: &str) -> bool {
    allowed.iter().any(|entry| element.contains(entry.as_str()))
}
