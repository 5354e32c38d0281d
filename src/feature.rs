use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::organisation::{User, UserGroupSummary};
use crate::value::{FeatureStateValue, FlagsmithValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    Standard,
    Multivariate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    Stale,
    Unhealthy,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagStrategy {
    Intersection,
    Union,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub color: String,
    pub description: String,
    pub project: i64,
    pub label: String,
    pub is_system_tag: bool,
    pub is_permanent: bool,
    #[serde(rename = "type")]
    pub tag_type: TagType,
}

/// One variant of a multivariate flag and its default weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateOption {
    pub id: i64,
    pub uuid: String,
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<i64>,
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    pub default_percentage_allocation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateFeatureStateValue {
    pub id: i64,
    pub multivariate_feature_option: i64,
    pub percentage_allocation: f64,
}

/// A multivariate allocation before it has been persisted, so without an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateFeatureStateValueInput {
    pub multivariate_feature_option: i64,
    pub percentage_allocation: f64,
}

impl From<MultivariateFeatureStateValue> for MultivariateFeatureStateValueInput {
    fn from(value: MultivariateFeatureStateValue) -> Self {
        Self {
            multivariate_feature_option: value.multivariate_feature_option,
            percentage_allocation: value.percentage_allocation,
        }
    }
}

/// Links a feature to a segment override with its evaluation priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSegment {
    pub id: i64,
    pub priority: i64,
    pub segment: i64,
    pub uuid: String,
}

/// A feature's value in one scope: the environment default, an identity
/// override or a segment override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_request: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub enabled: bool,
    pub environment: i64,
    pub environment_feature_version: Option<String>,
    pub feature: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_segment: Option<FeatureSegment>,
    pub feature_state_value: Option<FlagsmithValue>,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_from: Option<DateTime<Utc>>,
    pub multivariate_feature_state_values: Vec<MultivariateFeatureStateValue>,
    pub updated_at: DateTime<Utc>,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl FeatureState {
    pub fn is_segment_override(&self) -> bool {
        self.feature_segment.is_some()
    }

    pub fn is_identity_override(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_environment_default(&self) -> bool {
        !self.is_segment_override() && !self.is_identity_override()
    }
}

/// Same record as [`FeatureState`] with the value in its typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedFeatureState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_request: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub enabled: bool,
    pub environment: i64,
    pub environment_feature_version: Option<String>,
    pub feature: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_segment: Option<FeatureSegment>,
    pub feature_state_value: FeatureStateValue,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_from: Option<DateTime<Utc>>,
    pub multivariate_feature_state_values: Vec<MultivariateFeatureStateValue>,
    pub updated_at: DateTime<Utc>,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// Feature state payload of the versioning API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVersionState {
    pub enabled: bool,
    pub feature: i64,
    pub feature_state_value: FeatureStateValue,
    pub feature_segment: Option<FeatureSegment>,
    pub multivariate_feature_state_values: Vec<MultivariateFeatureStateValueInput>,
    #[serde(default)]
    pub live_from: Option<DateTime<Utc>>,
}

/// Immutable snapshot of an environment's states for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVersion {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version_uuid: Option<String>,
    pub published: bool,
    pub live_from: Option<DateTime<Utc>>,
    pub uuid: String,
    pub is_live: bool,
    pub published_by: Option<i64>,
    pub created_by: Option<i64>,
}

impl FeatureVersion {
    /// Published but scheduled for a later time than `now`.
    pub fn is_scheduled(&self, now: DateTime<Utc>) -> bool {
        self.published && self.live_from.is_some_and(|live_from| live_from > now)
    }
}

/// A feature as defined at project level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFlag {
    pub created_date: DateTime<Utc>,
    pub default_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub id: i64,
    pub initial_value: Option<FlagsmithValue>,
    pub is_archived: bool,
    pub is_num_identity_overrides_complete: bool,
    pub is_server_key_only: bool,
    pub multivariate_options: Vec<MultivariateOption>,
    pub name: String,
    pub num_identity_overrides: Option<i64>,
    pub num_segment_overrides: Option<i64>,
    pub owners: Vec<User>,
    pub owner_groups: Vec<UserGroupSummary>,
    pub metadata: Vec<Metadata>,
    pub project: i64,
    pub tags: Vec<i64>,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub uuid: String,
}

impl ProjectFlag {
    pub fn is_multivariate(&self) -> bool {
        self.feature_type == FeatureType::Multivariate
    }
}

/// The feature state nested in a segment override create response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSegmentValue {
    pub id: i64,
    pub environment: i64,
    pub enabled: bool,
    pub feature: i64,
    pub feature_state_value: FeatureStateValue,
    pub deleted_at: Option<DateTime<Utc>>,
    pub uuid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Option<i64>,
    pub live_from: Option<DateTime<Utc>>,
    pub identity: Option<String>,
    pub change_request: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSegmentOverride {
    pub id: i64,
    pub segment: i64,
    pub priority: i64,
    pub uuid: String,
    pub environment: i64,
    pub feature: i64,
    pub feature_segment_value: FeatureSegmentValue,
    pub value: String,
}
