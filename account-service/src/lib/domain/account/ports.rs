use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::errors::NotifierError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AuthenticatedAccount;
use crate::account::models::CreateAccountCommand;
use crate::account::models::SignupCommand;
use crate::account::models::UpdateAccountCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account and issue a session token.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn signup(&self, command: SignupCommand) -> Result<AuthenticatedAccount, AccountError>;

    /// Verify credentials and issue a session token.
    ///
    /// # Errors
    /// * `UnknownEmail` - No account with this email
    /// * `IncorrectPassword` - Password does not match
    async fn login(&self, email: &str, password: &str)
        -> Result<AuthenticatedAccount, AccountError>;

    /// Step A of the reset protocol: generate a code, persist its digest and
    /// expiry, and mail the plaintext code to the account owner.
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No account with this email
    /// * `DeliveryFailed` - Email could not be sent; reset fields rolled back
    async fn forgot_password(&self, email: &str) -> Result<(), AccountError>;

    /// Step B of the reset protocol: check a submitted code against the
    /// stored digest and mark the reset as verified.
    ///
    /// # Errors
    /// * `InvalidOrExpiredResetCode` - No live reset matches the code
    async fn verify_reset_code(&self, code: &str) -> Result<(), AccountError>;

    /// Step C of the reset protocol: commit the new password and issue a
    /// fresh session token.
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No account with this email
    /// * `ResetNotVerified` - No verified, unexpired reset for this account
    async fn reset_password(
        &self,
        email: &str,
        new_password: String,
    ) -> Result<String, AccountError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Retrieve all accounts.
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError>;

    /// Create an account with an explicit role (admin operation).
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    async fn create_account(&self, command: CreateAccountCommand)
        -> Result<Account, AccountError>;

    /// Update profile fields on an existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    async fn update_account(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, AccountError>;

    /// Delete an existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn delete_account(&self, id: &AccountId) -> Result<(), AccountError>;

    /// Re-hash the password and stamp `password_changed_at` (admin-issued).
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn change_password(
        &self,
        id: &AccountId,
        new_password: String,
    ) -> Result<Account, AccountError>;

    /// Self-service password change: re-hash, stamp, and re-issue a token,
    /// since the caller's current token becomes stale.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn change_my_password(
        &self,
        id: &AccountId,
        new_password: String,
    ) -> Result<AuthenticatedAccount, AccountError>;
}

/// Persistence operations for the account aggregate.
///
/// Each operation is atomic per record; one request's update cannot observe
/// another's half-applied state.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by identifier; `None` if not found.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by (case-normalized) email; `None` if not found.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Retrieve the account holding a live reset for this digest: the stored
    /// digest matches and the expiry is after `now`. `None` covers wrong,
    /// expired, and never-requested codes alike.
    async fn find_by_reset_digest(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountError>;

    /// Retrieve all accounts.
    async fn list_all(&self) -> Result<Vec<Account>, AccountError>;

    /// Update an existing account in place.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    async fn update(&self, account: Account) -> Result<Account, AccountError>;

    /// Remove an account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn delete(&self, id: &AccountId) -> Result<(), AccountError>;
}

/// Outgoing email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Port for outbound email delivery.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver a message.
    ///
    /// # Errors
    /// * `DeliveryFailure` - Transport-level delivery failed
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError>;
}
