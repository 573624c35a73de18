//! Member entity - any account in a library (members, librarians, supervisors)

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{LibraryId, UserId, UserRole};

/// Password reset tokens are accepted for this many hours after issue
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Created by a librarian, waiting for the setup link to be used
    Pending,
    Active,
    Inactive,
}

text_enum!(UserStatus, "account status", {
    Pending => "pending",
    Active => "active",
    Inactive => "inactive",
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub library_id: LibraryId,
    /// Library-scoped code shown on the member card
    pub user_code: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == UserStatus::Pending
    }

    /// Only active accounts with the member role can borrow or reserve
    pub fn ensure_can_borrow(&self) -> Result<(), DomainError> {
        if self.role != UserRole::Member {
            return Err(DomainError::ValidationError(
                "Only members can borrow or reserve books".to_string(),
            ));
        }
        if !self.is_active() {
            return Err(DomainError::ValidationError(format!(
                "Member account is {}",
                self.status
            )));
        }
        Ok(())
    }

    /// Pending accounts stay until activated; everything else may be deactivated
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.is_pending() {
            Err(DomainError::CannotDeletePending)
        } else {
            Ok(())
        }
    }
}

/// Data for inserting a pending account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub library_id: LibraryId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub email_verification_token: String,
}

/// 32 random bytes, hex encoded (64 characters)
pub fn generate_account_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Throwaway password for accounts that are activated through the setup link
pub fn generate_temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

/// Library-scoped account code, e.g. `MEM-00012`
pub fn format_user_code(role: UserRole, sequence: i64) -> String {
    let prefix = match role {
        UserRole::Member => "MEM",
        UserRole::Librarian => "LIB",
        UserRole::Supervisor => "SUP",
    };
    format!("{prefix}-{sequence:05}")
}
