use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("name too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("invalid email address: {0}")]
    InvalidFormat(String),
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("unknown role: {0}")]
    Unknown(String),
}

/// Error for email delivery operations
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("failed to deliver email: {0}")]
    DeliveryFailure(String),
}

/// Top-level error for all account operations.
///
/// The display strings double as the user-facing messages where the HTTP
/// layer forwards them verbatim.
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("invalid account id: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("there is no user with this email, please sign up")]
    UnknownEmail,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("account not found: {0}")]
    NotFound(String),

    #[error("there is no user with this email {0}")]
    NotFoundByEmail(String),

    #[error("Invalid or Expired password reset code")]
    InvalidOrExpiredResetCode,

    #[error("password reset code not verified")]
    ResetNotVerified,

    #[error("there is a problem in sending email")]
    DeliveryFailed(String),

    // Infrastructure errors
    #[error("password error: {0}")]
    Password(String),

    #[error("token error: {0}")]
    Token(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<NotifierError> for AccountError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::DeliveryFailure(msg) => AccountError::DeliveryFailed(msg),
        }
    }
}

impl From<auth::PasswordError> for AccountError {
    fn from(err: auth::PasswordError) -> Self {
        AccountError::Password(err.to_string())
    }
}

impl From<auth::JwtError> for AccountError {
    fn from(err: auth::JwtError) -> Self {
        AccountError::Token(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Unknown(err.to_string())
    }
}
