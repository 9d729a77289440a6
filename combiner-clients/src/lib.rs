pub mod content;
pub mod health;
pub mod http;
pub mod internal_content;
pub mod kafka;
pub mod policy;

pub use content::ContentClient;
pub use health::{CheckResult, HealthCheck, HealthChecker};
pub use http::UrlTemplate;
pub use internal_content::InternalContentClient;
pub use policy::OpaClient;
