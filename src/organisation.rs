use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GettingStartedTask {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingTools {
    /// The backend treats a missing or null value as completed.
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(alias = "selection")]
    pub integrations: Vec<String>,
}

impl OnboardingTools {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Onboarding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<OnboardingTools>,
    #[serde(default)]
    pub tasks: Vec<GettingStartedTask>,
}

impl Onboarding {
    pub fn is_task_completed(&self, name: &str) -> bool {
        self.tasks
            .iter()
            .any(|task| task.name == name && task.completed_at.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Never set for users that have not logged in yet.
    pub last_login: Option<DateTime<Utc>>,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<Onboarding>,
    /// Present when the user is listed in the context of an organisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<OrganisationRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganisationRole {
    Admin,
    User,
}

/// A group member; unlike [`User`] it never carries an organisation role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub group_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroupSummary {
    pub external_id: Option<String>,
    pub id: i64,
    pub is_default: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroup {
    #[serde(flatten)]
    pub summary: UserGroupSummary,
    pub users: Vec<GroupUser>,
}

impl UserGroup {
    pub fn admins(&self) -> impl Iterator<Item = &GroupUser> {
        self.users.iter().filter(|user| user.group_admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub uuid: String,
    pub subscription_id: Option<String>,
    pub subscription_date: Option<DateTime<Utc>>,
    pub plan: Option<String>,
    pub max_seats: u32,
    pub max_api_calls: u64,
    pub cancellation_date: Option<DateTime<Utc>>,
    pub customer_id: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// Limits derived from the organisation's billing subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionMeta {
    pub max_seats: Option<u32>,
    pub audit_log_visibility_days: Option<u32>,
    pub feature_history_visibility_days: Option<u32>,
    pub max_api_calls: Option<u64>,
    pub max_projects: Option<u32>,
    pub payment_source: Option<String>,
    pub chargebee_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: i64,
    pub name: String,
    pub created_date: DateTime<Utc>,
    pub webhook_notification_email: Option<String>,
    pub num_seats: u32,
    pub subscription: Subscription,
    pub role: OrganisationRole,
    pub persist_trait_data: bool,
    pub block_access_to_admin: bool,
    pub restrict_project_create_to_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthType {
    Email,
    Github,
    Google,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupType {
    NoInvite,
    InviteEmail,
    InviteLink,
}

/// The current user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub first_name: String,
    pub last_name: String,
    pub sign_up_type: Option<SignupType>,
    pub id: i64,
    pub email: String,
    pub auth_type: AuthType,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountModel {
    #[serde(flatten)]
    pub user: User,
    pub organisations: Vec<Organisation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: i64,
    pub email: String,
    pub date_created: DateTime<Utc>,
    pub invited_by: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub permission_groups: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteLink {
    pub id: i64,
    pub hash: String,
    pub date_created: DateTime<Utc>,
    pub role: OrganisationRole,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InviteLink {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeName {
    Email,
    FirstName,
    LastName,
    Groups,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamlConfiguration {
    pub id: i64,
    pub organisation: i64,
    pub name: String,
    pub frontend_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_metadata_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_idp_initiated: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamlAttributeMapping {
    pub id: i64,
    pub saml_configuration: i64,
    pub django_attribute_name: AttributeName,
    pub idp_attribute_name: String,
}

/// Service provider metadata to hand over to the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamlMetadata {
    pub entity_id: String,
    pub response_url: String,
    pub metadata_xml: String,
}
