const MESSAGES_FORWARDED_METRIC_NAME: &str = "combiner_messages_forwarded_total";
const MESSAGES_DROPPED_METRIC_NAME: &str = "combiner_messages_dropped_total";
const FORCED_PUBLICATIONS_METRIC_NAME: &str = "combiner_forced_publications_total";

#[inline]
pub fn increment_forwarded() {
    metrics::counter!(MESSAGES_FORWARDED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_dropped(reason: &'static str) {
    metrics::counter!(MESSAGES_DROPPED_METRIC_NAME, "reason" => reason).increment(1);
}

#[inline]
pub fn increment_forced(outcome: &'static str) {
    metrics::counter!(FORCED_PUBLICATIONS_METRIC_NAME, "outcome" => outcome).increment(1);
}
