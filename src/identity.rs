use serde::{Deserialize, Serialize};

use crate::feature::FeatureType;
use crate::value::{FlagsmithValue, IdOrKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_alias: Option<String>,
}

impl Identity {
    /// The alias when one is set, the identifier otherwise.
    pub fn display_name(&self) -> &str {
        self.dashboard_alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityTrait {
    pub id: IdOrKey,
    pub trait_key: String,
    pub trait_value: Option<FlagsmithValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityMultivariateValue {
    pub multivariate_feature_option: OptionValue,
    pub percentage_allocation: f64,
}

/// A feature as evaluated for one identity, with the source of any override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityFeatureState {
    pub feature: FeatureSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_uuid: Option<String>,
    pub enabled: bool,
    pub feature_state_value: Option<FlagsmithValue>,
    /// Always null on this endpoint; kept so the shape round-trips.
    pub segment: Option<serde_json::Value>,
    /// `"IDENTITY"` or `"SEGMENT"` when the state is overridden.
    pub overridden_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multivariate_feature_state_values: Option<Vec<IdentityMultivariateValue>>,
}

impl IdentityFeatureState {
    pub fn is_overridden(&self) -> bool {
        self.overridden_by.is_some()
    }
}
