use crate::model::{
    AnnotationsMessage, CONTENT_COLLECTION_TYPE, CombinedModel, ContentModel, InternalContent,
};
use crate::result::{CombineError, CombineResult};
use crate::{Combiner, ContentFetcher, InternalContentFetcher};
use error_stack::{Report, ResultExt};
use tracing::{debug, instrument};

/// Joins the document store, content collection and internal content views of an item.
#[derive(Debug, Clone)]
pub struct DataCombiner<D, K, I> {
    documents: D,
    collections: K,
    internal: I,
}

impl<D, K, I> DataCombiner<D, K, I> {
    pub fn new(documents: D, collections: K, internal: I) -> Self {
        Self {
            documents,
            collections,
            internal,
        }
    }
}

impl<D, K, I> DataCombiner<D, K, I>
where
    D: ContentFetcher,
    K: ContentFetcher,
    I: InternalContentFetcher,
{
    async fn collection_fallback(&self, uuid: &str) -> CombineResult<CombinedModel> {
        let collection = self
            .collections
            .content(uuid)
            .await
            .change_context(CombineError::Fetch)
            .attach("content collection")?;

        match collection {
            Some(mut collection) if !collection.is_empty() => {
                debug!("found {uuid} in the content collection store");
                collection.set_content_type(CONTENT_COLLECTION_TYPE);
                let last_modified = collection.last_modified().to_string();
                Ok(CombinedModel {
                    uuid: uuid.to_string(),
                    content: Some(collection),
                    last_modified,
                    ..Default::default()
                })
            }
            _ => {
                debug!("{uuid} was not found in any store");
                Ok(CombinedModel {
                    uuid: uuid.to_string(),
                    ..Default::default()
                })
            }
        }
    }
}

impl<D, K, I> Combiner for DataCombiner<D, K, I>
where
    D: ContentFetcher,
    K: ContentFetcher,
    I: InternalContentFetcher,
{
    #[instrument(skip_all, name = "combiner#for_content", fields(uuid = content.uuid()))]
    async fn for_content(&self, content: ContentModel) -> CombineResult<CombinedModel> {
        let uuid = content.uuid().to_string();
        if uuid.is_empty() {
            return Err(Report::new(CombineError::NoContentUuid));
        }

        let internal = self
            .internal
            .internal_content(&uuid)
            .await
            .change_context(CombineError::Fetch)
            .attach("internal content")?;

        Ok(joined(uuid, content, internal))
    }

    #[instrument(skip_all, name = "combiner#for_annotations", fields(uuid = message.content_uuid()))]
    async fn for_annotations(&self, message: AnnotationsMessage) -> CombineResult<CombinedModel> {
        let uuid = message.content_uuid();
        if uuid.is_empty() {
            return Err(Report::new(CombineError::NoAnnotationsUuid));
        }

        self.by_identifier(uuid).await
    }

    #[instrument(skip(self), name = "combiner#by_identifier")]
    async fn by_identifier(&self, uuid: &str) -> CombineResult<CombinedModel> {
        let (content, internal) = tokio::join!(
            self.documents.content(uuid),
            self.internal.internal_content(uuid)
        );

        let content = content
            .change_context(CombineError::Fetch)
            .attach("document store")?;

        match content {
            Some(content) if !content.uuid().is_empty() => {
                let internal = internal
                    .change_context(CombineError::Fetch)
                    .attach("internal content")?;
                Ok(joined(uuid.to_string(), content, internal))
            }
            _ => self.collection_fallback(uuid).await,
        }
    }
}

fn joined(uuid: String, content: ContentModel, internal: Option<InternalContent>) -> CombinedModel {
    let last_modified = content.last_modified().to_string();
    let (internal_content, metadata) = match internal {
        Some(InternalContent {
            content,
            annotations,
        }) => (Some(content), annotations),
        None => (None, None),
    };

    CombinedModel {
        uuid,
        content: Some(content),
        internal_content,
        metadata,
        last_modified,
        ..Default::default()
    }
}
