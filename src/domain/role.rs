//! Roles and the static role-to-permission table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Permission group a user belongs to.
///
/// The set is closed: ids and names are fixed and seeded at startup, and
/// tokens carrying any other role name fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

/// Operations gated by role membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewUserBoard,
    ViewModeratorBoard,
    ViewAdminBoard,
    ListAllIncidents,
    DeleteAllIncidents,
    ViewMetrics,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Role does not exist = {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Self; 3] = [Self::User, Self::Moderator, Self::Admin];

    /// Role assigned when a signup request names none.
    pub const DEFAULT: Self = Self::User;

    /// Primary key of the seeded `roles` row.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::User => 1,
            Self::Moderator => 2,
            Self::Admin => 3,
        }
    }

    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::User),
            2 => Some(Self::Moderator),
            3 => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Authority string reported to clients, e.g. `ROLE_ADMIN`.
    #[must_use]
    pub const fn authority(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Moderator => "ROLE_MODERATOR",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::User => &[Permission::ViewUserBoard],
            Self::Moderator => &[Permission::ViewUserBoard, Permission::ViewModeratorBoard],
            Self::Admin => &[
                Permission::ViewUserBoard,
                Permission::ViewModeratorBoard,
                Permission::ViewAdminBoard,
                Permission::ListAllIncidents,
                Permission::DeleteAllIncidents,
                Permission::ViewMetrics,
            ],
        }
    }

    #[must_use]
    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// True when any of `roles` grants `permission`.
#[must_use]
pub fn any_grants(roles: &[Role], permission: Permission) -> bool {
    roles.iter().any(|role| role.grants(permission))
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(4), None);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" moderator ".parse::<Role>(), Ok(Role::Moderator));
        assert_eq!(
            "root".parse::<Role>(),
            Err(UnknownRole("root".to_string()))
        );
    }

    #[test]
    fn permission_table() {
        assert!(Role::User.grants(Permission::ViewUserBoard));
        assert!(!Role::User.grants(Permission::ListAllIncidents));
        assert!(Role::Moderator.grants(Permission::ViewModeratorBoard));
        assert!(!Role::Moderator.grants(Permission::ViewAdminBoard));
        assert!(Role::Admin.grants(Permission::DeleteAllIncidents));
        assert!(any_grants(
            &[Role::User, Role::Admin],
            Permission::ViewMetrics
        ));
        assert!(!any_grants(&[], Permission::ViewUserBoard));
    }

    #[test]
    fn unknown_role_is_rejected_by_serde() {
        assert_eq!(
            serde_json::from_str::<Role>("\"admin\"").unwrap(),
            Role::Admin
        );
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn authority_strings() {
        assert_eq!(Role::Admin.authority(), "ROLE_ADMIN");
        assert_eq!(Role::User.to_string(), "user");
    }
}
