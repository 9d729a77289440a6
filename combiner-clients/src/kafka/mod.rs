use error_stack::Report;

pub mod consumer;
pub mod message;
pub mod producer;

pub use consumer::{ConsumerConfig, ProxyConsumer};
pub use producer::ProxyProducer;

pub(crate) const V2_CONTENT_TYPE: &str = "application/vnd.kafka.v2+json";
pub(crate) const BINARY_CONTENT_TYPE: &str = "application/vnd.kafka.binary.v2+json";

pub type ConsumeResult<T> = Result<T, Report<ConsumeError>>;

#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    #[error("failed to create consumer instance")]
    CreateInstance,
    #[error("failed to subscribe consumer instance")]
    Subscribe,
    #[error("failed to poll records")]
    Poll,
    #[error("failed to delete consumer instance")]
    DeleteInstance,
}
