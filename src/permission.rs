use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::organisation::{User, UserGroupSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organisation: i64,
}

/// A permission key that can be granted on some object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailablePermission {
    pub key: String,
    pub description: String,
    pub supports_tag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    pub id: i64,
}

/// Where a permission comes from when it is not granted directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedPermission {
    pub groups: Vec<NamedRef>,
    pub roles: Vec<NamedRef>,
}

impl DerivedPermission {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.roles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub is_directly_granted: bool,
    pub permission_key: String,
    pub tags: Vec<i64>,
    pub derived_from: DerivedPermission,
}

impl Permission {
    pub fn is_derived(&self) -> bool {
        !self.derived_from.is_empty()
    }
}

/// The effective permissions of a user on one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPermissions {
    pub admin: bool,
    pub is_directly_granted: bool,
    pub derived_from: DerivedPermission,
    pub permissions: Vec<Permission>,
}

impl UserPermissions {
    pub fn has(&self, key: &str) -> bool {
        self.admin || self.permissions.iter().any(|p| p.permission_key == key)
    }
}

/// A permission grant to a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPermission {
    pub user: User,
    pub permissions: Vec<String>,
    pub admin: bool,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedPermission {
    pub permission_key: String,
    pub tags: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermission {
    pub user: User,
    pub permissions: Vec<TaggedPermission>,
    pub admin: bool,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPermission {
    pub group: UserGroupSummary,
    pub permissions: Vec<String>,
    pub admin: bool,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermissionUser {
    pub user: i64,
    pub role: i64,
    pub id: i64,
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermissionGroup {
    pub group: i64,
    pub role: i64,
    pub id: i64,
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMasterApiKey {
    pub id: i64,
    pub master_api_key: String,
    pub role: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterApiKeyWithRoles {
    pub id: String,
    pub prefix: String,
    pub roles: Vec<RolePermissionUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagBasedPermission {
    pub permissions: Vec<String>,
    pub tags: Vec<i64>,
}

/// Permission flags of the caller on a single object, keyed by permission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPermissions {
    #[serde(rename = "ADMIN")]
    pub admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_based_permissions: Option<Vec<TagBasedPermission>>,
    #[serde(flatten)]
    pub permissions: HashMap<String, bool>,
}

impl EntityPermissions {
    pub fn has(&self, key: &str) -> bool {
        self.admin || self.permissions.get(key).copied().unwrap_or(false)
    }

    /// Whether `key` is granted for an object carrying `tag`.
    pub fn has_for_tag(&self, key: &str, tag: i64) -> bool {
        if self.has(key) {
            return true;
        }
        self.tag_based_permissions.iter().flatten().any(|grant| {
            grant.tags.contains(&tag) && grant.permissions.iter().any(|p| p == key)
        })
    }
}
