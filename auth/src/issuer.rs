use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Mints and verifies session tokens.
///
/// Wraps [`JwtHandler`] with a fixed expiry window so callers only deal in
/// account ids. The signing secret and window come from configuration at
/// construction time.
pub struct TokenIssuer {
    handler: JwtHandler,
    expiration_hours: i64,
}

impl TokenIssuer {
    /// Create an issuer with the given signing secret and token lifetime.
    pub fn new(secret: &[u8], expiration_hours: i64) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            expiration_hours,
        }
    }

    /// Mint a session token for an account.
    ///
    /// The token carries the account id and issue time; its expiry is the
    /// configured window from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, account_id: impl ToString) -> Result<String, JwtError> {
        let claims = Claims::for_account(account_id, self.expiration_hours);
        self.handler.encode(&claims)
    }

    /// Verify a presented token and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` - Past the expiry window
    /// * `InvalidSignature` - Signed with a different secret
    /// * `Malformed` - Not a decodable token
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.handler.decode(token)
    }
}
