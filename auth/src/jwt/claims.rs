use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token claims.
///
/// The token is a signed proof of identity: the account id, when it was
/// issued, and when it stops being accepted. Nothing else is encoded; all
/// other account state is loaded fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account identifier
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for an account, issued now and expiring after
    /// `expiration_hours`.
    pub fn for_account(account_id: impl ToString, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(expiration_hours);

        Self {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Whether the token was issued before the given password change.
    ///
    /// A token minted before the account's password last changed is stale:
    /// changing the password is the only invalidation mechanism, there is no
    /// revocation list. Timestamps are compared at second granularity, and a
    /// token issued in the same second as the change is still accepted.
    pub fn predates_password_change(&self, password_changed_at: DateTime<Utc>) -> bool {
        password_changed_at.timestamp() > self.iat
    }
}
