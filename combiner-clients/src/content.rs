use crate::http::{UrlTemplate, get_body};
use combiner_core::ContentFetcher;
use combiner_core::model::ContentModel;
use combiner_core::result::{FetchError, OptFetchResult};
use error_stack::ResultExt;
use reqwest::Client;
use tracing::instrument;

/// Reads content from a JSON store addressed by a URL template.
///
/// Backs both the document store and the content collection fallback.
#[derive(Debug, Clone)]
pub struct ContentClient {
    client: Client,
    url: UrlTemplate,
}

impl ContentClient {
    pub fn new(client: Client, url: UrlTemplate) -> Self {
        Self { client, url }
    }
}

impl ContentFetcher for ContentClient {
    #[instrument(skip(self), name = "content_client#content")]
    async fn content(&self, uuid: &str) -> OptFetchResult<ContentModel> {
        let url = self.url.url_for(uuid);
        let Some(body) = get_body(&self.client, &url).await? else {
            return Ok(None);
        };

        serde_json::from_slice(&body)
            .map(Some)
            .change_context(FetchError::ParseContent)
            .attach(url)
    }
}
