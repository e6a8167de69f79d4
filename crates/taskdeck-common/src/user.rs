//! User accounts and roles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried by a backend user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    /// Admins and managers share most management permissions server-side.
    pub fn can_manage(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown role '{0}', expected admin, manager or employee")]
pub struct ParseRoleError(String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// A backend user record (employee, manager or admin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// The role the backend actually enforces: superusers act as admins
    /// regardless of the stored `role` field.
    pub fn effective_role(&self) -> Role {
        if self.is_superuser { Role::Admin } else { self.role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"employee\"").unwrap(),
            Role::Employee
        );
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn superuser_is_effectively_admin() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "username": "root", "role": "employee", "is_superuser": true}"#,
        )
        .unwrap();
        assert_eq!(user.effective_role(), Role::Admin);
        assert!(user.effective_role().can_manage());
    }

    #[test]
    fn missing_optional_fields_default() {
        let user: User =
            serde_json::from_str(r#"{"id": 7, "username": "ann", "role": "manager"}"#).unwrap();
        assert_eq!(user.email, None);
        assert!(!user.is_superuser);
        assert_eq!(user.effective_role(), Role::Manager);
    }
}
