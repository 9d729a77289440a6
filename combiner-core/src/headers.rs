pub const TRANSACTION_ID: &str = "X-Request-Id";
pub const MESSAGE_TYPE: &str = "Message-Type";
pub const ORIGIN_SYSTEM_ID: &str = "Origin-System-Id";
pub const CONTENT_TYPE: &str = "Content-Type";

pub const COMBINED_MESSAGE_TYPE: &str = "cms-combined-content-published";
pub const ANNOTATIONS_MESSAGE_TYPE: &str = "concept-annotation";
pub const FORCED_ORIGIN_SYSTEM: &str = "forced-combined-msg";
pub const JSON_CONTENT_TYPE: &str = "application/json";
