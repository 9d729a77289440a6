use error_stack::Report;

pub type FetchResult<T> = Result<T, Report<FetchError>>;
pub type OptFetchResult<T> = Result<Option<T>, Report<FetchError>>;
pub type CombineResult<T> = Result<T, Report<CombineError>>;
pub type ForwardResult<T> = Result<T, Report<ForwardError>>;
pub type PolicyResult<T> = Result<T, Report<PolicyError>>;
pub type ProduceResult<T> = Result<T, Report<ProduceError>>;
pub type PublishResult<T> = Result<T, Report<PublishError>>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to send request to upstream service")]
    Request,
    #[error("upstream service responded with status {0}")]
    Status(u16),
    #[error("failed to parse content")]
    ParseContent,
    #[error("failed to parse internal content")]
    ParseInternalContent,
    #[error("failed to parse annotations from internal content")]
    ParseAnnotations,
}

#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    #[error("content has no UUID provided")]
    NoContentUuid,
    #[error("annotations have no UUID referenced")]
    NoAnnotationsUuid,
    #[error("failed to fetch data for combination")]
    Fetch,
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("content type {0:?} is not supported")]
    InvalidContentType(String),
    #[error("failed to evaluate publication policy")]
    PolicyEvaluation,
    #[error("{0}")]
    PolicySkip(String),
    #[error("failed to serialize combined message")]
    Serialize,
    #[error("error forwarding message to Kafka")]
    Send,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to reach policy agent")]
    Request,
    #[error("policy agent responded with status {0}")]
    Status(u16),
    #[error("failed to parse policy decision")]
    Parse,
}

#[derive(Debug, thiserror::Error)]
pub enum ProduceError {
    #[error("failed to reach queue proxy")]
    Request,
    #[error("queue proxy responded with status {0}")]
    Status(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("content not found")]
    NotFound,
    #[error("content type is not supported")]
    InvalidContentType,
    #[error("failed to combine content")]
    Combine,
    #[error("failed to forward combined content")]
    Forward,
}
