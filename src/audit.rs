use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::{Environment, ProjectSummary};
use crate::organisation::User;
use crate::value::FlagsmithValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelatedObjectType {
    Feature,
    FeatureState,
    Environment,
    ChangeRequest,
    Segment,
    EfVersion,
    EdgeIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogItem {
    pub id: i64,
    pub created_date: DateTime<Utc>,
    pub log: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    pub project: ProjectSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_object_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_feature_id: Option<i64>,
    pub related_object_type: RelatedObjectType,
    pub is_system_event: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Option<FlagsmithValue>,
    pub new: Option<FlagsmithValue>,
}

/// An audit log entry with a field-level diff of the change it records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogDetail {
    #[serde(flatten)]
    pub item: AuditLogItem,
    pub change_details: Vec<FieldChange>,
}
