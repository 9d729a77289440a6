use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

const UUID_FIELD: &str = "uuid";
const TYPE_FIELD: &str = "type";
const LAST_MODIFIED_FIELD: &str = "lastModified";
const DELETED_FIELD: &str = "deleted";

/// The `type` forced onto content that only exists in the collection store.
pub const CONTENT_COLLECTION_TYPE: &str = "ContentCollection";

pub type Headers = HashMap<String, String>;

/// One published item, as an open JSON object.
///
/// Upstream schemas vary by content type, so only the handful of keys the
/// pipeline actually reads get typed accessors. Missing or non-string values
/// read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentModel(Map<String, Value>);

impl ContentModel {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn uuid(&self) -> &str {
        self.str_field(UUID_FIELD)
    }

    pub fn content_type(&self) -> &str {
        self.str_field(TYPE_FIELD)
    }

    pub fn last_modified(&self) -> &str {
        self.str_field(LAST_MODIFIED_FIELD)
    }

    /// Delete events flag themselves with `deleted`, either as a bool or as the string `"true"`.
    pub fn is_deleted(&self) -> bool {
        match self.0.get(DELETED_FIELD) {
            Some(Value::Bool(deleted)) => *deleted,
            Some(Value::String(deleted)) => deleted.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.0
            .insert(TYPE_FIELD.to_string(), Value::String(content_type.into()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for ContentModel {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// The enriched view of an item, with its annotations split out of the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalContent {
    pub content: ContentModel,
    pub annotations: Option<Vec<Annotation>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub thing: Thing,
}

impl From<Thing> for Annotation {
    fn from(thing: Thing) -> Self {
        Self { thing }
    }
}

/// A concept reference as the internal content service renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thing {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pref_label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub predicate: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub direct_type: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub thing_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lei_code: String,
    #[serde(rename = "FIGI", skip_serializing_if = "String::is_empty")]
    pub figi: String,
    #[serde(rename = "NAICS", skip_serializing_if = "Vec::is_empty")]
    pub naics: Vec<IndustryClassification>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_deprecated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndustryClassification {
    pub identifier: String,
    pub pref_label: String,
    pub rank: i64,
}

/// The joined view of one item that gets published downstream.
///
/// Field order here is the field order on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CombinedModel {
    pub uuid: String,
    pub content: Option<ContentModel>,
    pub internal_content: Option<ContentModel>,
    pub metadata: Option<Vec<Annotation>>,
    pub content_uri: String,
    pub last_modified: String,
    pub deleted: bool,
}

impl CombinedModel {
    /// A delete event carries nothing but its identifying fields.
    pub fn deleted(uuid: String, content_uri: String, last_modified: String) -> Self {
        Self {
            uuid,
            content_uri,
            last_modified,
            deleted: true,
            ..Default::default()
        }
    }

    /// UUID of the embedded content, empty when there is none.
    pub fn content_uuid(&self) -> &str {
        self.content.as_ref().map(ContentModel::uuid).unwrap_or_default()
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Nothing was found for the identifier in any store.
    pub fn is_not_found(&self) -> bool {
        self.content_uuid().is_empty() && !self.has_metadata()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentMessage {
    pub content_uri: String,
    #[serde(rename = "payload", deserialize_with = "null_as_default")]
    pub content: ContentModel,
    pub last_modified: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotationsMessage {
    pub content_uri: String,
    #[serde(rename = "payload")]
    pub annotations: Option<AnnotationsPayload>,
    pub last_modified: String,
}

impl AnnotationsMessage {
    pub fn content_uuid(&self) -> &str {
        self.annotations
            .as_ref()
            .map(|a| a.uuid.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationsPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub annotations: Vec<Annotation>,
    pub uuid: String,
}

/// An opaque message as it travels through the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueMessage {
    pub headers: Headers,
    pub body: String,
}

impl QueueMessage {
    pub fn new(headers: Headers, body: impl Into<String>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolicyDecision {
    pub skip: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub reasons: Vec<String>,
}

impl PolicyDecision {
    pub fn joined_reasons(&self) -> String {
        self.reasons.join(", ")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(value: Value) -> ContentModel {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_keys_read_as_empty() {
        let model = ContentModel::default();

        assert_eq!("", model.uuid());
        assert_eq!("", model.content_type());
        assert_eq!("", model.last_modified());
        assert!(!model.is_deleted());
    }

    #[test]
    fn non_string_values_read_as_empty() {
        let model = content(json!({ "uuid": 12, "type": null }));

        assert_eq!("", model.uuid());
        assert_eq!("", model.content_type());
    }

    #[test]
    fn deleted_flag_accepts_bool_and_string() {
        assert!(content(json!({ "deleted": true })).is_deleted());
        assert!(content(json!({ "deleted": "true" })).is_deleted());
        assert!(!content(json!({ "deleted": false })).is_deleted());
        assert!(!content(json!({ "deleted": "no" })).is_deleted());
    }

    #[test]
    fn combined_model_serializes_in_wire_order() {
        let model = CombinedModel {
            uuid: "0cef259d-030d-497d-b4ef-e8fa0ee6db6b".to_string(),
            content: Some(content(json!({
                "uuid": "0cef259d-030d-497d-b4ef-e8fa0ee6db6b",
                "title": "simple title",
                "type": "Article",
            }))),
            content_uri: "http://upp-content-validator.svc.ft.com/content/0cef259d-030d-497d-b4ef-e8fa0ee6db6b".to_string(),
            last_modified: "2017-03-30T13:09:06.48Z".to_string(),
            ..Default::default()
        };

        assert_eq!(
            r#"{"uuid":"0cef259d-030d-497d-b4ef-e8fa0ee6db6b","content":{"title":"simple title","type":"Article","uuid":"0cef259d-030d-497d-b4ef-e8fa0ee6db6b"},"internalContent":null,"metadata":null,"contentUri":"http://upp-content-validator.svc.ft.com/content/0cef259d-030d-497d-b4ef-e8fa0ee6db6b","lastModified":"2017-03-30T13:09:06.48Z","deleted":false}"#,
            serde_json::to_string(&model).unwrap()
        );
    }

    #[test]
    fn thing_omits_empty_fields() {
        let annotation = Annotation::from(Thing {
            id: "http://api.ft.com/things/9a6861ff-50ef-4e40-acf7-6659e127ae4e".to_string(),
            pref_label: "India".to_string(),
            thing_type: "LOCATION".to_string(),
            ..Default::default()
        });

        assert_eq!(
            json!({ "thing": {
                "id": "http://api.ft.com/things/9a6861ff-50ef-4e40-acf7-6659e127ae4e",
                "prefLabel": "India",
                "type": "LOCATION",
            }}),
            serde_json::to_value(&annotation).unwrap()
        );
    }

    #[test]
    fn thing_keeps_industry_classification_names() {
        let thing: Thing = serde_json::from_value(json!({
            "id": "http://api.ft.com/things/1",
            "leiCode": "LEI",
            "FIGI": "BBG000",
            "NAICS": [{ "identifier": "5112", "prefLabel": "Software", "rank": 1 }],
            "isDeprecated": true,
        }))
        .unwrap();

        assert_eq!("LEI", thing.lei_code);
        assert_eq!("BBG000", thing.figi);
        assert_eq!(1, thing.naics[0].rank);
        assert!(thing.is_deprecated);

        let value = serde_json::to_value(&thing).unwrap();
        assert_eq!(json!("BBG000"), value["FIGI"]);
        assert_eq!(json!("Software"), value["NAICS"][0]["prefLabel"]);
    }

    #[test]
    fn combined_model_survives_serialization() {
        let metadata = vec![
            Annotation::from(Thing {
                id: "http://api.ft.com/things/1".to_string(),
                predicate: "http://www.ft.com/ontology/annotation/mentions".to_string(),
                ..Default::default()
            }),
            Annotation::from(Thing {
                id: "http://api.ft.com/things/2".to_string(),
                types: vec!["http://www.ft.com/ontology/person/Person".to_string()],
                ..Default::default()
            }),
        ];
        let model = CombinedModel {
            uuid: "some-uuid".to_string(),
            content: Some(content(json!({ "uuid": "some-uuid", "type": "Article" }))),
            internal_content: Some(content(json!({ "uuid": "some-uuid" }))),
            metadata: Some(metadata.clone()),
            content_uri: "http://upp-content-validator.svc.ft.com/content/some-uuid".to_string(),
            last_modified: "2017-03-30T13:09:06.48Z".to_string(),
            deleted: false,
        };

        let decoded: CombinedModel =
            serde_json::from_str(&serde_json::to_string(&model).unwrap()).unwrap();

        assert_eq!(model.uuid, decoded.uuid);
        assert_eq!(model.deleted, decoded.deleted);
        assert_eq!(model.last_modified, decoded.last_modified);
        assert_eq!(model.content_uri, decoded.content_uri);
        let decoded_metadata = decoded.metadata.unwrap();
        assert_eq!(metadata.len(), decoded_metadata.len());
        assert!(metadata.iter().all(|a| decoded_metadata.contains(a)));
    }

    #[test]
    fn not_found_means_no_content_uuid_and_no_metadata() {
        let model = CombinedModel {
            uuid: "x".to_string(),
            ..Default::default()
        };
        assert!(model.is_not_found());

        let model = CombinedModel {
            uuid: "x".to_string(),
            metadata: Some(vec![Annotation::default()]),
            ..Default::default()
        };
        assert!(!model.is_not_found());
    }

    #[test]
    fn content_message_tolerates_null_payload() {
        let message: ContentMessage = serde_json::from_value(json!({
            "contentUri": "http://upp-content-validator.svc.ft.com/content/x",
            "payload": null,
            "lastModified": "2017-03-30T13:09:06.48Z",
        }))
        .unwrap();

        assert!(message.content.is_empty());
        assert_eq!("2017-03-30T13:09:06.48Z", message.last_modified);
    }

    #[test]
    fn annotations_message_reads_subject_uuid() {
        let message: AnnotationsMessage = serde_json::from_value(json!({
            "contentUri": "http://binding-service.svc.ft.com/annotations/x",
            "payload": {
                "uuid": "4de8b414-c5aa-11e6-9043-7e34c07b46ef",
                "annotations": [{ "thing": { "id": "http://api.ft.com/things/1" } }],
            },
            "lastModified": "2017-03-30T13:09:06.48Z",
        }))
        .unwrap();

        assert_eq!("4de8b414-c5aa-11e6-9043-7e34c07b46ef", message.content_uuid());
        assert_eq!(1, message.annotations.unwrap().annotations.len());

        let empty: AnnotationsMessage =
            serde_json::from_value(json!({ "payload": null })).unwrap();
        assert_eq!("", empty.content_uuid());
    }
}
