use crate::headers::{
    CONTENT_TYPE, FORCED_ORIGIN_SYSTEM, JSON_CONTENT_TYPE, ORIGIN_SYSTEM_ID, TRANSACTION_ID,
};
use crate::metrics;
use crate::model::Headers;
use crate::result::{ForwardError, PublishError, PublishResult};
use crate::tid::TidGenerator;
use crate::{Combiner, ForcePublisher, Forwarder};
use error_stack::{Report, ResultExt};
use tracing::{Instrument, error, info, info_span};

/// Runs combine and forward for a single identifier on request, bypassing the queue.
#[derive(Debug)]
pub struct OnDemandPublisher<C, F> {
    combiner: C,
    forwarder: F,
    tids: TidGenerator,
}

impl<C, F> OnDemandPublisher<C, F> {
    pub fn new(combiner: C, forwarder: F) -> Self {
        Self {
            combiner,
            forwarder,
            tids: TidGenerator::default(),
        }
    }
}

fn forced_headers(tid: &str) -> Headers {
    Headers::from([
        (TRANSACTION_ID.to_string(), tid.to_string()),
        (CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()),
        (ORIGIN_SYSTEM_ID.to_string(), FORCED_ORIGIN_SYSTEM.to_string()),
    ])
}

impl<C, F> OnDemandPublisher<C, F>
where
    C: Combiner,
    F: Forwarder,
{
    async fn publish(&self, uuid: &str, tid: &str) -> PublishResult<()> {
        let combined = self
            .combiner
            .by_identifier(uuid)
            .await
            .change_context(PublishError::Combine)?;

        if combined.is_not_found() {
            info!("could not find content or metadata, nothing to publish");
            return Err(Report::new(PublishError::NotFound).attach(format!("uuid {uuid}")));
        }

        let mut headers = forced_headers(tid);
        self.forwarder
            .filter_and_forward(&mut headers, &combined)
            .await
            .map_err(|e| {
                let context = match e.current_context() {
                    ForwardError::InvalidContentType(_) => PublishError::InvalidContentType,
                    _ => PublishError::Forward,
                };
                e.change_context(context)
            })
    }
}

impl<C, F> ForcePublisher for OnDemandPublisher<C, F>
where
    C: Combiner + 'static,
    F: Forwarder + 'static,
{
    async fn force_publish(&self, uuid: &str, tid: Option<String>) -> PublishResult<()> {
        let tid = tid
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.tids.generate_forced());
        let span = info_span!("publisher#force_publish", transaction_id = %tid, uuid);

        let result = self.publish(uuid, &tid).instrument(span.clone()).await;

        let _entered = span.enter();
        match &result {
            Ok(()) => {
                info!("forced publication succeeded");
                metrics::increment_forced("published");
            }
            Err(e) => match e.current_context() {
                PublishError::NotFound => metrics::increment_forced("not_found"),
                PublishError::InvalidContentType => {
                    info!("forced publication rejected: {e}");
                    metrics::increment_forced("invalid_content_type");
                }
                _ => {
                    error!("forced publication failed: {e:?}");
                    metrics::increment_forced("failed");
                }
            },
        }
        result
    }
}
