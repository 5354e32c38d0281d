use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feature::{FeatureState, TypedFeatureState};
use crate::value::IdOrKey;

/// A user or group nominated to approve a change request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequestSummary {
    pub id: i64,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub description: String,
    pub user: i64,
    pub committed_at: Option<DateTime<Utc>>,
    pub committed_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub live_from: Option<DateTime<Utc>>,
}

/// A recorded approval of a change request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequestApproval {
    pub id: i64,
    pub user: i64,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub group: i64,
}

/// A segment-level change set proposed for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub feature: i64,
    pub live_from: Option<DateTime<Utc>>,
    pub feature_states_to_update: Vec<FeatureState>,
    pub feature_states_to_create: Vec<FeatureState>,
    pub segment_ids_to_delete_overrides: Vec<i64>,
}

/// Another change request already published over the same scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConflict {
    pub segment_id: Option<i64>,
    pub original_cr_id: Option<i64>,
    pub published_at: DateTime<Utc>,
    pub is_environment_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStateWithConflict {
    #[serde(flatten)]
    pub state: TypedFeatureState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<FeatureConflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFeatureVersionRef {
    pub uuid: String,
    pub feature_states: Vec<FeatureState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub environment: i64,
    pub title: String,
    pub description: IdOrKey,
    pub feature_states: Vec<FeatureState>,
    pub user: i64,
    /// Epoch timestamp of the commit.
    pub committed_at: Option<i64>,
    pub committed_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub approvals: Vec<ChangeRequestApproval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_sets: Option<Vec<ChangeSet>>,
    pub is_approved: bool,
    pub is_committed: bool,
    pub group_assignments: Vec<GroupAssignment>,
    pub environment_feature_versions: Vec<EnvironmentFeatureVersionRef>,
    #[serde(default)]
    pub conflicts: Vec<FeatureConflict>,
}

impl ChangeRequest {
    pub fn is_pending(&self) -> bool {
        !self.is_committed && self.deleted_at.is_none()
    }

    /// Users whose approval has been recorded, in approval order.
    pub fn approved_by(&self) -> Vec<i64> {
        self.approvals
            .iter()
            .filter(|approval| approval.approved_at.is_some())
            .map(|approval| approval.user)
            .collect()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}
