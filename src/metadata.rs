use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::IdOrKey;

/// A metadata value attached to a segment, environment or flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub model_field: IdOrKey,
    pub field_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataField {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub description: String,
    pub organisation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsRequiredFor {
    pub content_type: i64,
}

/// Binds a metadata field to a content type, optionally making it required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataModelField {
    pub id: String,
    pub field: i64,
    pub content_type: IdOrKey,
    pub is_required_for: Vec<IsRequiredFor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: i64,
    pub app_label: String,
    pub model: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}
