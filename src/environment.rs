use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i64,
    pub name: String,
    pub is_creating: bool,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_colour: Option<String>,
    pub project: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_change_request_approvals: Option<u32>,
    pub allow_client_traits: bool,
    pub hide_sensitive_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_segment_overrides: Option<i64>,
    pub use_v2_feature_versioning: bool,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
    pub use_identity_overrides_in_local_eval: bool,
    pub use_identity_composite_key_for_hashing: bool,
    /// `None` defers to the project setting.
    pub hide_disabled_flags: Option<bool>,
    pub use_mv_v2_evaluation: bool,
    pub show_disabled_flags: bool,
    #[serde(
        rename = "enabledFeatureVersioning",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled_feature_versioning: Option<bool>,
}

impl Environment {
    pub fn requires_change_requests(&self) -> bool {
        self.minimum_change_request_approvals.is_some()
    }
}

/// A project without its environments, as returned by the project list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub organisation: i64,
    pub hide_disabled_flags: bool,
    pub enable_dynamo_db: bool,
    pub migration_status: String,
    pub use_edge_identities: bool,
    pub show_edge_identity_overrides_for_feature: bool,
    pub prevent_flag_defaults: bool,
    pub enable_realtime_updates: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_segments_allowed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_features_allowed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_segment_overrides_allowed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_features: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_flags_limit_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_segments: Option<u32>,
}

impl ProjectSummary {
    /// Remaining segment capacity, if the project has a limit.
    pub fn segments_remaining(&self) -> Option<u32> {
        let max = self.max_segments_allowed?;
        Some(max.saturating_sub(self.total_segments.unwrap_or(0)))
    }

    /// Remaining feature capacity, if the project has a limit.
    pub fn features_remaining(&self) -> Option<u32> {
        let max = self.max_features_allowed?;
        Some(max.saturating_sub(self.total_features.unwrap_or(0)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub summary: ProjectSummary,
    pub environments: Vec<Environment>,
}

impl Project {
    pub fn environment_by_key(&self, api_key: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.api_key == api_key)
    }
}

/// A server-side environment key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub id: i64,
    pub key: String,
    pub name: String,
}
