use combiner_core::ForcePublisher;
use combiner_core::result::PublishResult;
use std::sync::Arc;
use tracing::instrument;

/// Shares one publisher between every request handler.
#[derive(Debug)]
pub struct PublishService<P> {
    publisher: Arc<P>,
}

impl<P> Clone for PublishService<P> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<P: ForcePublisher> PublishService<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            publisher: Arc::new(publisher),
        }
    }

    #[instrument(skip_all, name = "service#force_publish")]
    pub async fn force_publish(&self, uuid: &str, tid: Option<String>) -> PublishResult<()> {
        self.publisher.force_publish(uuid, tid).await
    }
}
