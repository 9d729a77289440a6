use crate::http::{UrlTemplate, get_body};
use combiner_core::InternalContentFetcher;
use combiner_core::model::{Annotation, ContentModel, InternalContent, Thing};
use combiner_core::result::{FetchError, FetchResult, OptFetchResult};
use error_stack::ResultExt;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

const ANNOTATIONS_FIELD: &str = "annotations";

#[derive(Debug, Deserialize)]
struct EmbeddedAnnotations {
    #[serde(default)]
    annotations: Option<Vec<Thing>>,
}

#[derive(Debug, Clone)]
pub struct InternalContentClient {
    client: Client,
    url: UrlTemplate,
}

impl InternalContentClient {
    pub fn new(client: Client, url: UrlTemplate) -> Self {
        Self { client, url }
    }
}

impl InternalContentFetcher for InternalContentClient {
    #[instrument(skip(self), name = "internal_content_client#internal_content")]
    async fn internal_content(&self, uuid: &str) -> OptFetchResult<InternalContent> {
        let url = self.url.url_for(uuid);
        let Some(body) = get_body(&self.client, &url).await? else {
            return Ok(None);
        };

        parse(&body).attach(url).map(Some)
    }
}

fn parse(body: &[u8]) -> FetchResult<InternalContent> {
    let mut content: ContentModel =
        serde_json::from_slice(body).change_context(FetchError::ParseInternalContent)?;
    let embedded: EmbeddedAnnotations =
        serde_json::from_slice(body).change_context(FetchError::ParseAnnotations)?;
    content.remove(ANNOTATIONS_FIELD);

    Ok(InternalContent {
        content,
        annotations: embedded
            .annotations
            .map(|things| things.into_iter().map(Annotation::from).collect()),
    })
}
