use combiner_core::result::{FetchError, OptFetchResult};
use error_stack::{Report, ResultExt};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

const UUID_PLACEHOLDER: &str = "{uuid}";

/// A base URL plus an endpoint carrying `{uuid}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    base_url: String,
    endpoint: String,
}

impl UrlTemplate {
    pub fn new(base_url: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// An empty `uuid` leaves the placeholders in place.
    pub fn url_for(&self, uuid: &str) -> String {
        let url = format!("{}{}", self.base_url, self.endpoint);
        if uuid.is_empty() {
            url
        } else {
            url.replace(UUID_PLACEHOLDER, uuid)
        }
    }
}

/// GETs `url`, mapping 404 to `None` and any other non-200 to an error.
#[instrument(skip(client))]
pub(crate) async fn get_body(client: &Client, url: &str) -> OptFetchResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .change_context(FetchError::Request)
        .attach_with(|| url.to_string())?;

    match response.status() {
        StatusCode::OK => {
            let body = response
                .bytes()
                .await
                .change_context(FetchError::Request)
                .attach_with(|| url.to_string())?;
            Ok(Some(body.to_vec()))
        }
        StatusCode::NOT_FOUND => {
            debug!("{url} responded with not found");
            Ok(None)
        }
        status => Err(Report::new(FetchError::Status(status.as_u16())).attach(url.to_string())),
    }
}
