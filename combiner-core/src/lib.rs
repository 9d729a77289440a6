use model::{
    AnnotationsMessage, CombinedModel, ContentModel, Headers, InternalContent, PolicyDecision,
    QueueMessage,
};
use result::{
    CombineResult, ForwardResult, OptFetchResult, PolicyResult, ProduceResult, PublishResult,
};
use serde_json::Value;

pub mod combiner;
pub mod forwarder;
pub mod headers;
pub mod metrics;
pub mod model;
pub mod publisher;
pub mod result;
pub mod router;
pub mod tid;

#[cfg(test)]
mod mocks;

/// Reads the public view of an item. `None` means the store does not know it.
pub trait ContentFetcher: Send + Sync {
    fn content(&self, uuid: &str) -> impl Future<Output = OptFetchResult<ContentModel>> + Send;
}

pub trait InternalContentFetcher: Send + Sync {
    fn internal_content(
        &self,
        uuid: &str,
    ) -> impl Future<Output = OptFetchResult<InternalContent>> + Send;
}

pub trait PolicyEvaluator: Send + Sync {
    fn evaluate(&self, input: Value) -> impl Future<Output = PolicyResult<PolicyDecision>> + Send;
}

pub trait MessageProducer: Send + Sync {
    fn send(&self, message: QueueMessage) -> impl Future<Output = ProduceResult<()>> + Send;
}

pub trait Combiner: Send + Sync {
    fn for_content(
        &self,
        content: ContentModel,
    ) -> impl Future<Output = CombineResult<CombinedModel>> + Send;

    fn for_annotations(
        &self,
        message: AnnotationsMessage,
    ) -> impl Future<Output = CombineResult<CombinedModel>> + Send;

    fn by_identifier(&self, uuid: &str)
    -> impl Future<Output = CombineResult<CombinedModel>> + Send;
}

pub trait Forwarder: Send + Sync {
    /// Admits, evaluates and sends `message`. On success `headers` has gained a `Message-Type`.
    fn filter_and_forward(
        &self,
        headers: &mut Headers,
        message: &CombinedModel,
    ) -> impl Future<Output = ForwardResult<()>> + Send;
}

pub trait ForcePublisher: Send + Sync + 'static {
    fn force_publish(
        &self,
        uuid: &str,
        tid: Option<String>,
    ) -> impl Future<Output = PublishResult<()>> + Send;
}
