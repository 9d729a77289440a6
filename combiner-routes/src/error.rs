use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use combiner_core::result::PublishError;
use error_stack::Report;

#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError(Report<PublishError>);

impl EndpointError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.current_context() {
            PublishError::NotFound => StatusCode::NOT_FOUND,
            PublishError::InvalidContentType => StatusCode::UNPROCESSABLE_ENTITY,
            PublishError::Combine | PublishError::Forward => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Debug for EndpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Report<PublishError>> for EndpointError {
    fn from(value: Report<PublishError>) -> Self {
        Self(value)
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, self.0.current_context().to_string()).into_response()
    }
}
