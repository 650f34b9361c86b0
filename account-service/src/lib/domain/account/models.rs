use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::account::errors::NameError;
use crate::account::errors::RoleError;

/// Account aggregate entity.
///
/// The password is never stored in plaintext; `password_hash` is recomputed
/// exactly when the plaintext password changes. The three reset fields carry
/// the state of an in-flight password reset: digest and expiry are present
/// together or both absent, and `reset_verified` is true only between a
/// successful code verification and the subsequent commit.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub name: DisplayName,
    pub slug: String,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub reset_code_digest: Option<String>,
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    pub reset_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Clear the in-flight reset state.
    ///
    /// Called on every successful password change and on the delivery
    /// rollback path, so no half-set reset state survives.
    pub fn clear_reset_fields(&mut self) {
        self.reset_code_digest = None;
        self.reset_code_expires_at = None;
        self.reset_verified = false;
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Trimmed, at least 3 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 3;

    /// Create a validated display name.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 3 characters after trimming
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(NameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(name))
    }

    /// Derive the URL slug for this name: lowercased, non-alphanumeric runs
    /// collapsed to single hyphens.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.0.len());
        let mut last_was_hyphen = true;
        for c in self.0.chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
                last_was_hyphen = false;
            } else if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
        slug.trim_end_matches('-').to_string()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validated against RFC 5322 and stored lowercase, so the uniqueness
/// invariant is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a validated, case-normalized email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Privilege tier gating access to restricted routes.
///
/// Exact membership only: `manager` does not imply `admin` and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account: Account,
    pub token: String,
}

/// Command to register a new account through signup.
#[derive(Debug)]
pub struct SignupCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: String,
}

/// Command for admin account creation, with an explicit role.
#[derive(Debug)]
pub struct CreateAccountCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: String,
    pub role: Role,
}

/// Command to update profile fields.
///
/// All fields optional for partial updates. The password never travels
/// through this command; password changes have their own operations so the
/// digest-recompute and `password_changed_at` stamping cannot be skipped.
#[derive(Debug, Default)]
pub struct UpdateAccountCommand {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub role: Option<Role>,
}
