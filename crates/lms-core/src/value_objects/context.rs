//! Request context - the caller identity every service operation runs under

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LibraryId, UserId};
use crate::error::DomainError;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Librarian,
    Member,
    Supervisor,
}

impl UserRole {
    /// Database / wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Librarian => "librarian",
            Self::Member => "member",
            Self::Supervisor => "supervisor",
        }
    }

    /// Librarians and supervisors run the desk; members only see their own data
    #[inline]
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Librarian | Self::Supervisor)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "librarian" => Ok(Self::Librarian),
            "member" => Ok(Self::Member),
            "supervisor" => Ok(Self::Supervisor),
            other => Err(DomainError::ValidationError(format!("Unknown role: {other}"))),
        }
    }
}

/// Identity of the caller, extracted once per request from the bearer token
/// and passed explicitly into every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub library_id: LibraryId,
    pub user_id: UserId,
    pub role: UserRole,
}

impl RequestContext {
    pub fn new(library_id: LibraryId, user_id: UserId, role: UserRole) -> Self {
        Self {
            library_id,
            user_id,
            role,
        }
    }

    /// Fail unless the caller is a librarian or supervisor
    pub fn require_staff(&self) -> Result<(), DomainError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Librarian access required".to_string()))
        }
    }

    /// Staff may act on anyone in their library; members only on themselves
    pub fn require_self_or_staff(&self, user_id: UserId) -> Result<(), DomainError> {
        if self.role.is_staff() || self.user_id == user_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Cannot access another member's records".to_string(),
            ))
        }
    }
}
