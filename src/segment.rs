use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::value::{FlagsmithValue, IdOrKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    All,
    Any,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operator: String,
    pub property: String,
    pub value: Option<FlagsmithValue>,
}

/// Per-field validation messages for a condition, as echoed by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentConditionsError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<String>>,
}

/// An AND/OR/NOT group of conditions and nested rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRule {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub rules: Vec<SegmentRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
    #[serde(default)]
    pub conditions: Vec<SegmentCondition>,
}

impl SegmentRule {
    /// Every condition in this rule and its descendants, depth-first.
    pub fn conditions_recursive(&self) -> Vec<&SegmentCondition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a SegmentCondition>) {
        out.extend(self.conditions.iter());
        for rule in &self.rules {
            rule.collect_conditions(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    pub rules: Vec<SegmentRule>,
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project: IdOrKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<i64>,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
}

impl Segment {
    pub fn condition_count(&self) -> usize {
        self.rules
            .iter()
            .map(|rule| rule.conditions_recursive().len())
            .sum()
    }

    /// Segments created from a feature's page are scoped to that feature.
    pub fn is_feature_specific(&self) -> bool {
        self.feature.is_some()
    }
}

/// An entry of the segment operator catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub value: Option<String>,
    pub label: String,
    #[serde(rename = "hideValue", default, skip_serializing_if = "Option::is_none")]
    pub hide_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(rename = "valuePlaceholder", default, skip_serializing_if = "Option::is_none")]
    pub value_placeholder: Option<String>,
}
