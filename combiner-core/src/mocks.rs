#![allow(dead_code, unused_variables)]

use crate::model::{
    AnnotationsMessage, CombinedModel, ContentModel, InternalContent, PolicyDecision, QueueMessage,
};
use crate::result::{CombineResult, OptFetchResult, PolicyResult, ProduceResult};
use crate::{
    Combiner, ContentFetcher, InternalContentFetcher, MessageProducer, PolicyEvaluator,
};
use mockall::automock;
use serde_json::{Value, json};

pub struct ContentStore;

#[automock]
impl ContentFetcher for ContentStore {
    async fn content(&self, uuid: &str) -> OptFetchResult<ContentModel> {
        unreachable!()
    }
}

pub struct InternalContentStore;

#[automock]
impl InternalContentFetcher for InternalContentStore {
    async fn internal_content(&self, uuid: &str) -> OptFetchResult<InternalContent> {
        unreachable!()
    }
}

pub struct Policy;

#[automock]
impl PolicyEvaluator for Policy {
    async fn evaluate(&self, input: Value) -> PolicyResult<PolicyDecision> {
        unreachable!()
    }
}

pub struct Producer;

#[automock]
impl MessageProducer for Producer {
    async fn send(&self, message: QueueMessage) -> ProduceResult<()> {
        unreachable!()
    }
}

pub struct DataJoin;

#[automock]
impl Combiner for DataJoin {
    async fn for_content(&self, content: ContentModel) -> CombineResult<CombinedModel> {
        unreachable!()
    }

    async fn for_annotations(&self, message: AnnotationsMessage) -> CombineResult<CombinedModel> {
        unreachable!()
    }

    async fn by_identifier(&self, uuid: &str) -> CombineResult<CombinedModel> {
        unreachable!()
    }
}

pub const CONTENT_UUID: &str = "0cef259d-030d-497d-b4ef-e8fa0ee6db6b";
pub const CONTENT_URI: &str =
    "http://upp-content-validator.svc.ft.com/content/0cef259d-030d-497d-b4ef-e8fa0ee6db6b";
pub const LAST_MODIFIED: &str = "2017-03-30T13:09:06.48Z";

pub fn content(value: Value) -> ContentModel {
    serde_json::from_value(value).unwrap()
}

pub fn article() -> ContentModel {
    content(json!({
        "uuid": CONTENT_UUID,
        "title": "simple title",
        "type": "Article",
        "lastModified": LAST_MODIFIED,
    }))
}

pub fn allow_all_policy() -> MockPolicy {
    let mut policy = MockPolicy::new();
    policy
        .expect_evaluate()
        .returning(|_| Ok(PolicyDecision::default()));
    policy
}
