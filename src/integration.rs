use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::FlagsmithValue;

/// A GitHub issue or pull request as proxied by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubResource {
    pub html_url: String,
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
}

/// A repository linked to a project through the GitHub integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepository {
    pub id: i64,
    pub github_configuration: i64,
    pub project: i64,
    pub repository_owner: String,
    pub repository_name: String,
    pub tagging_enabled: bool,
}

impl GithubRepository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.repository_owner, self.repository_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubIntegration {
    pub id: String,
    pub installation_id: String,
    pub organisation: String,
}

/// A link from a feature to something outside Flagsmith, e.g. a GitHub issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, FlagsmithValue>>,
    pub feature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationFieldOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationField {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(rename = "inputType", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<IntegrationFieldOption>>,
}

/// An entry of the integration catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationData {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    pub external: bool,
    pub image: String,
    #[serde(default)]
    pub fields: Option<Vec<IntegrationField>>,
    pub is_external_installation: bool,
    pub per_environment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_oauth: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveIntegration {
    pub id: String,
    #[serde(
        rename = "flagsmithEnvironment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flagsmith_environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchDarklyImportStatus {
    pub requested_environment_count: u32,
    pub requested_flag_count: u32,
    pub result: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchDarklyProjectImport {
    pub id: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: LaunchDarklyImportStatus,
    pub project: i64,
}

impl LaunchDarklyProjectImport {
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn failed(&self) -> bool {
        self.status.error_message.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStrategy {
    Skip,
    OverwriteDestructive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportExportStatus {
    Success,
    Processing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImport {
    pub id: i64,
    pub status: ImportExportStatus,
    pub strategy: ImportStrategy,
    pub environment_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureExport {
    pub id: String,
    pub name: String,
    pub environment_id: String,
    pub status: ImportExportStatus,
    pub created_at: DateTime<Utc>,
}

/// One flag of an export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportItem {
    pub name: String,
    pub default_enabled: bool,
    pub is_server_key_only: bool,
    pub initial_value: Option<FlagsmithValue>,
    pub value: Option<FlagsmithValue>,
    pub enabled: bool,
    #[serde(default)]
    pub multivariate: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: i64,
    pub url: String,
    pub secret: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
