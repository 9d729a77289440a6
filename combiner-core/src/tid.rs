use crate::headers::TRANSACTION_ID;
use crate::model::Headers;
use rand::Rng;
use rand::distributions::Alphanumeric;

pub const SERVICE_SUFFIX: &str = "_post_publication_combiner";

const TID_PREFIX: &str = "tid_";
const FORCED_TID_PREFIX: &str = "tid_force_publish";
const RANDOM_LEN: usize = 10;

/// Builds transaction ids of the form `<prefix><10 random alphanumerics><suffix>`.
#[derive(Debug, Clone)]
pub struct TidGenerator {
    suffix: String,
}

impl Default for TidGenerator {
    fn default() -> Self {
        Self::new(SERVICE_SUFFIX)
    }
}

impl TidGenerator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn generate(&self) -> String {
        self.with_prefix(TID_PREFIX)
    }

    pub fn generate_forced(&self) -> String {
        self.with_prefix(FORCED_TID_PREFIX)
    }

    /// Returns the transaction id carried by `headers`, writing a fresh one
    /// back into them when the header is missing or blank.
    pub fn ensure(&self, headers: &mut Headers) -> String {
        match headers.get(TRANSACTION_ID) {
            Some(tid) if !tid.is_empty() => tid.clone(),
            _ => {
                let tid = self.generate();
                headers.insert(TRANSACTION_ID.to_string(), tid.clone());
                tid
            }
        }
    }

    fn with_prefix(&self, prefix: &str) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_LEN)
            .map(char::from)
            .collect();
        format!("{prefix}{random}{}", self.suffix)
    }
}
