use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::FeatureStateValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthEventType {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEventReasonTextBlock {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEventReasonUrlBlock {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthEventReason {
    #[serde(default)]
    pub text_blocks: Vec<HealthEventReasonTextBlock>,
    #[serde(default)]
    pub url_blocks: Vec<HealthEventReasonUrlBlock>,
}

/// A health report about one feature in one environment, from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEvent {
    pub created_at: DateTime<Utc>,
    pub environment: i64,
    pub feature: i64,
    pub provider_name: String,
    pub reason: Option<HealthEventReason>,
    #[serde(rename = "type")]
    pub event_type: HealthEventType,
}

impl HealthEvent {
    pub fn is_unhealthy(&self) -> bool {
        self.event_type == HealthEventType::Unhealthy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProvider {
    pub id: i64,
    pub created_by: String,
    pub name: String,
    pub project: i64,
    pub webhook_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PConfidence {
    VeryLow,
    Low,
    Reasonable,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitTestFeature {
    pub created_date: DateTime<Utc>,
    pub default_enabled: bool,
    pub description: serde_json::Value,
    pub id: i64,
    pub initial_value: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitTestVariant {
    pub conversion_count: u64,
    pub evaluation_count: u64,
    pub conversion_percentage: f64,
    pub pvalue: f64,
    pub confidence: PConfidence,
    pub value_data: FeatureStateValue,
}

/// Conversion results of a multivariate feature across its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitTestResult {
    pub results: Vec<SplitTestVariant>,
    pub feature: SplitTestFeature,
    pub max_conversion_percentage: f64,
    pub max_conversion_count: u64,
    pub conversion_variance: f64,
    pub max_conversion_pvalue: f64,
}

impl SplitTestResult {
    /// The variant with the highest conversion percentage.
    pub fn leader(&self) -> Option<&SplitTestVariant> {
        self.results
            .iter()
            .max_by(|a, b| a.conversion_percentage.total_cmp(&b.conversion_percentage))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServersideSplitTestResult {
    pub conversion_count: u64,
    pub evaluation_count: u64,
    pub feature: SplitTestFeature,
    pub pvalue: f64,
    pub value_data: FeatureStateValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    pub id: i64,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub flags: u64,
    #[serde(rename = "environmentDocument")]
    pub environment_document: u64,
    pub identities: u64,
    pub traits: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub environment_document: Option<u64>,
    pub flags: Option<u64>,
    pub identities: Option<u64>,
    pub traits: Option<u64>,
    pub name: String,
}

/// API usage of an organisation: totals and a per-period breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganisationUsage {
    pub totals: UsageTotals,
    pub events_list: Vec<UsageEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricEntity {
    Features,
    Identities,
    Segments,
    Workflows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMetric {
    pub value: f64,
    pub description: String,
    pub name: String,
    pub entity: MetricEntity,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMetrics {
    pub metrics: Vec<EnvironmentMetric>,
}

impl EnvironmentMetrics {
    /// Metrics sorted by rank, lowest first.
    pub fn ranked(&self) -> Vec<&EnvironmentMetric> {
        let mut metrics: Vec<_> = self.metrics.iter().collect();
        metrics.sort_by_key(|metric| metric.rank);
        metrics
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontendVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_commit_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfHostedData {
    pub has_users: bool,
    pub has_logins: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendVersion {
    pub ci_commit_sha: String,
    pub image_tag: String,
    pub has_email_provider: bool,
    pub is_enterprise: bool,
    pub is_saas: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_hosted_data: Option<SelfHostedData>,
}

/// Build information of a running deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub tag: String,
    pub backend_sha: String,
    pub frontend_sha: String,
    #[serde(default)]
    pub frontend: FrontendVersion,
    pub backend: BackendVersion,
}
