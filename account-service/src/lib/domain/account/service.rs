use std::sync::Arc;

use auth::TokenIssuer;
use chrono::Duration;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AuthenticatedAccount;
use crate::account::models::CreateAccountCommand;
use crate::account::models::SignupCommand;
use crate::account::models::UpdateAccountCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::EmailMessage;
use crate::account::ports::Notifier;
use async_trait::async_trait;

/// How long a mailed reset code stays redeemable.
const RESET_CODE_TTL_MINUTES: i64 = 10;

/// Domain service implementation for account operations.
///
/// Composes the repository, the notifier, and the auth primitives. The
/// token issuer and hasher are constructed once at startup and read-only
/// afterwards.
pub struct AccountService<AR, N>
where
    AR: AccountRepository,
    N: Notifier,
{
    repository: Arc<AR>,
    notifier: Arc<N>,
    token_issuer: Arc<TokenIssuer>,
    password_hasher: auth::PasswordHasher,
}

impl<AR, N> AccountService<AR, N>
where
    AR: AccountRepository,
    N: Notifier,
{
    pub fn new(repository: Arc<AR>, notifier: Arc<N>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            repository,
            notifier,
            token_issuer,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    /// Re-hash the password, stamp the change, and drop any in-flight reset.
    async fn apply_password_change(
        &self,
        mut account: Account,
        new_password: &str,
    ) -> Result<Account, AccountError> {
        account.password_hash = self.password_hasher.hash(new_password)?;
        account.password_changed_at = Some(Utc::now());
        account.clear_reset_fields();

        self.repository.update(account).await
    }

    fn reset_code_email(account: &Account, code: &str) -> EmailMessage {
        EmailMessage {
            to: account.email.as_str().to_string(),
            subject: "Reset Password Code (Valid for 10min)".to_string(),
            html: format!(
                "<div>\
                 <h1>Hi {},</h1>\
                 <p>Enter this code to complete the reset.</p>\
                 <strong>{}</strong>\
                 <p>The code is valid for {} minutes.</p>\
                 </div>",
                account.name.as_str(),
                code,
                RESET_CODE_TTL_MINUTES,
            ),
        }
    }
}

#[async_trait]
impl<AR, N> AccountServicePort for AccountService<AR, N>
where
    AR: AccountRepository,
    N: Notifier,
{
    async fn signup(&self, command: SignupCommand) -> Result<AuthenticatedAccount, AccountError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(AccountError::EmailAlreadyExists);
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let account = Account {
            id: AccountId::new(),
            slug: command.name.slug(),
            name: command.name,
            email: command.email,
            password_hash,
            role: Default::default(),
            active: true,
            password_changed_at: None,
            reset_code_digest: None,
            reset_code_expires_at: None,
            reset_verified: false,
            created_at: Utc::now(),
        };

        let account = self.repository.create(account).await?;
        let token = self.token_issuer.issue(account.id)?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(AuthenticatedAccount { account, token })
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedAccount, AccountError> {
        let email = email.trim().to_lowercase();
        let account = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UnknownEmail)?;

        let matches = self
            .password_hasher
            .verify(password, &account.password_hash)?;
        if !matches {
            return Err(AccountError::IncorrectPassword);
        }

        let token = self.token_issuer.issue(account.id)?;

        Ok(AuthenticatedAccount { account, token })
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AccountError> {
        let email = email.trim().to_lowercase();
        let mut account = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AccountError::NotFoundByEmail(email.clone()))?;

        let generated = auth::reset::generate();

        account.reset_code_digest = Some(generated.digest);
        account.reset_code_expires_at =
            Some(Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES));
        account.reset_verified = false;

        let mut account = self.repository.update(account).await?;

        let message = Self::reset_code_email(&account, &generated.code);
        if let Err(e) = self.notifier.send(&message).await {
            // The account must not be left with a code nobody received.
            tracing::error!(account_id = %account.id, error = %e, "Reset code delivery failed, rolling back");
            account.clear_reset_fields();
            self.repository.update(account).await?;
            return Err(e.into());
        }

        tracing::info!(account_id = %account.id, "Reset code issued");

        Ok(())
    }

    async fn verify_reset_code(&self, code: &str) -> Result<(), AccountError> {
        let digest = auth::reset::digest(code.trim());

        let mut account = self
            .repository
            .find_by_reset_digest(&digest, Utc::now())
            .await?
            .ok_or(AccountError::InvalidOrExpiredResetCode)?;

        // Digest and expiry stay in place so a retried verify still succeeds.
        account.reset_verified = true;
        self.repository.update(account).await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        email: &str,
        new_password: String,
    ) -> Result<String, AccountError> {
        let email = email.trim().to_lowercase();
        let account = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AccountError::NotFoundByEmail(email.clone()))?;

        // A verified reset expires with its code window; verification alone
        // is not an open-ended grant.
        let window_open = account
            .reset_code_expires_at
            .map(|expires_at| expires_at > Utc::now())
            .unwrap_or(false);
        if !account.reset_verified || !window_open {
            return Err(AccountError::ResetNotVerified);
        }

        let account = self.apply_password_change(account, &new_password).await?;
        let token = self.token_issuer.issue(account.id)?;

        tracing::info!(account_id = %account.id, "Password reset committed");

        Ok(token)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError> {
        self.repository.list_all().await
    }

    async fn create_account(
        &self,
        command: CreateAccountCommand,
    ) -> Result<Account, AccountError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(AccountError::EmailAlreadyExists);
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let account = Account {
            id: AccountId::new(),
            slug: command.name.slug(),
            name: command.name,
            email: command.email,
            password_hash,
            role: command.role,
            active: true,
            password_changed_at: None,
            reset_code_digest: None,
            reset_code_expires_at: None,
            reset_verified: false,
            created_at: Utc::now(),
        };

        self.repository.create(account).await
    }

    async fn update_account(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, AccountError> {
        let mut account = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))?;

        if let Some(new_name) = command.name {
            account.slug = new_name.slug();
            account.name = new_name;
        }

        if let Some(new_email) = command.email {
            account.email = new_email;
        }

        if let Some(new_role) = command.role {
            account.role = new_role;
        }

        self.repository.update(account).await
    }

    async fn delete_account(&self, id: &AccountId) -> Result<(), AccountError> {
        self.repository.delete(id).await
    }

    async fn change_password(
        &self,
        id: &AccountId,
        new_password: String,
    ) -> Result<Account, AccountError> {
        let account = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))?;

        self.apply_password_change(account, &new_password).await
    }

    async fn change_my_password(
        &self,
        id: &AccountId,
        new_password: String,
    ) -> Result<AuthenticatedAccount, AccountError> {
        let account = self.change_password(id, new_password).await?;
        // The caller's current token is now stale; hand back a fresh one.
        let token = self.token_issuer.issue(account.id)?;

        Ok(AuthenticatedAccount { account, token })
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::account::errors::NotifierError;
    use crate::account::models::DisplayName;
    use crate::account::models::EmailAddress;
    use crate::account::models::Role;

    mock! {
        pub TestAccountRepository {}

        #[async_trait]
        impl AccountRepository for TestAccountRepository {
            async fn create(&self, account: Account) -> Result<Account, AccountError>;
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;
            async fn find_by_reset_digest(
                &self,
                digest: &str,
                now: DateTime<Utc>,
            ) -> Result<Option<Account>, AccountError>;
            async fn list_all(&self) -> Result<Vec<Account>, AccountError>;
            async fn update(&self, account: Account) -> Result<Account, AccountError>;
            async fn delete(&self, id: &AccountId) -> Result<(), AccountError>;
        }
    }

    mock! {
        pub TestNotifier {}

        #[async_trait]
        impl Notifier for TestNotifier {
            async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError>;
        }
    }

    fn test_issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(
            b"test-secret-key-for-jwt-signing-at-least-32-bytes",
            24,
        ))
    }

    fn test_account(password_hash: &str) -> Account {
        Account {
            id: AccountId::new(),
            name: DisplayName::new("Ann".to_string()).unwrap(),
            slug: "ann".to_string(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password_hash: password_hash.to_string(),
            role: Role::User,
            active: true,
            password_changed_at: None,
            reset_code_digest: None,
            reset_code_expires_at: None,
            reset_verified: false,
            created_at: Utc::now(),
        }
    }

    fn service(
        repository: MockTestAccountRepository,
        notifier: MockTestNotifier,
    ) -> AccountService<MockTestAccountRepository, MockTestNotifier> {
        AccountService::new(Arc::new(repository), Arc::new(notifier), test_issuer())
    }

    #[tokio::test]
    async fn test_signup_success() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|account| {
                account.email.as_str() == "a@x.com"
                    && account.slug == "ann"
                    && account.role == Role::User
                    && account.password_hash.starts_with("$argon2")
                    && account.password_changed_at.is_none()
                    && !account.reset_verified
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = service(repository, notifier);
        let command = SignupCommand {
            name: DisplayName::new("Ann".to_string()).unwrap(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password: "secret1".to_string(),
        };

        let result = service.signup(command).await.expect("signup failed");
        assert!(!result.token.is_empty());

        let claims = test_issuer().verify(&result.token).expect("bad token");
        assert_eq!(claims.sub, result.account.id.to_string());
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_account("$argon2id$hash"))));
        repository.expect_create().times(0);

        let service = service(repository, notifier);
        let command = SignupCommand {
            name: DisplayName::new("Ann".to_string()).unwrap(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password: "secret1".to_string(),
        };

        let result = service.signup(command).await;
        assert!(matches!(result, Err(AccountError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_success_normalizes_email() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        let hash = auth::PasswordHasher::new().hash("secret1").unwrap();
        let account = test_account(&hash);
        let account_id = account.id;

        repository
            .expect_find_by_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let service = service(repository, notifier);
        let result = service
            .login("  A@X.com ", "secret1")
            .await
            .expect("login failed");

        assert_eq!(result.account.id, account_id);
        assert!(!result.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_incorrect_password() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        let hash = auth::PasswordHasher::new().hash("secret1").unwrap();
        let account = test_account(&hash);

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let service = service(repository, notifier);
        let result = service.login("a@x.com", "wrong").await;
        assert!(matches!(result, Err(AccountError::IncorrectPassword)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, notifier);
        let result = service.login("nobody@x.com", "secret1").await;
        assert!(matches!(result, Err(AccountError::UnknownEmail)));
    }

    #[tokio::test]
    async fn test_forgot_password_stores_digest_and_sends_code() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_account("$argon2id$hash"))));
        repository
            .expect_update()
            .withf(|account| {
                let digest_ok = account
                    .reset_code_digest
                    .as_deref()
                    .map(|d| d.len() == 64)
                    .unwrap_or(false);
                let expiry_ok = account
                    .reset_code_expires_at
                    .map(|at| {
                        let seconds = (at - Utc::now()).num_seconds();
                        (590..=600).contains(&seconds)
                    })
                    .unwrap_or(false);
                digest_ok && expiry_ok && !account.reset_verified
            })
            .times(1)
            .returning(|account| Ok(account));
        notifier
            .expect_send()
            .withf(|message| {
                message.to == "a@x.com"
                    && message.subject.contains("Reset Password Code")
                    // The mail carries the plaintext code, not the digest.
                    && !message.html.contains("$argon2")
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repository, notifier);
        service
            .forgot_password("a@x.com")
            .await
            .expect("forgot_password failed");
    }

    #[tokio::test]
    async fn test_forgot_password_rolls_back_on_delivery_failure() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_account("$argon2id$hash"))));
        // First update sets the reset fields
        repository
            .expect_update()
            .withf(|account| account.reset_code_digest.is_some())
            .times(1)
            .returning(|account| Ok(account));
        // Rollback update clears them again
        repository
            .expect_update()
            .withf(|account| {
                account.reset_code_digest.is_none()
                    && account.reset_code_expires_at.is_none()
                    && !account.reset_verified
            })
            .times(1)
            .returning(|account| Ok(account));
        notifier
            .expect_send()
            .times(1)
            .returning(|_| Err(NotifierError::DeliveryFailure("smtp down".to_string())));

        let service = service(repository, notifier);
        let result = service.forgot_password("a@x.com").await;
        assert!(matches!(result, Err(AccountError::DeliveryFailed(_))));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        notifier.expect_send().times(0);

        let service = service(repository, notifier);
        let result = service.forgot_password("nobody@x.com").await;
        assert!(matches!(result, Err(AccountError::NotFoundByEmail(_))));
    }

    #[tokio::test]
    async fn test_verify_reset_code_marks_verified_and_keeps_code() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        let expected_digest = auth::reset::digest("123456");
        let stored_digest = expected_digest.clone();

        repository
            .expect_find_by_reset_digest()
            .withf(move |digest, _| digest == expected_digest)
            .times(1)
            .returning(move |_, _| {
                let mut account = test_account("$argon2id$hash");
                account.reset_code_digest = Some(stored_digest.clone());
                account.reset_code_expires_at = Some(Utc::now() + Duration::minutes(5));
                Ok(Some(account))
            });
        repository
            .expect_update()
            .withf(|account| {
                // Verified, but digest and expiry survive for idempotent retries
                account.reset_verified
                    && account.reset_code_digest.is_some()
                    && account.reset_code_expires_at.is_some()
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = service(repository, notifier);
        service
            .verify_reset_code("123456")
            .await
            .expect("verify failed");
    }

    #[tokio::test]
    async fn test_verify_reset_code_no_match() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_reset_digest()
            .times(1)
            .returning(|_, _| Ok(None));
        repository.expect_update().times(0);

        let service = service(repository, notifier);
        let result = service.verify_reset_code("000000").await;
        assert!(matches!(
            result,
            Err(AccountError::InvalidOrExpiredResetCode)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_commits_and_clears_fields() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| {
                let mut account = test_account("$argon2id$old_hash");
                account.reset_code_digest = Some(auth::reset::digest("123456"));
                account.reset_code_expires_at = Some(Utc::now() + Duration::minutes(5));
                account.reset_verified = true;
                Ok(Some(account))
            });
        repository
            .expect_update()
            .withf(|account| {
                account.password_hash.starts_with("$argon2")
                    && account.password_hash != "$argon2id$old_hash"
                    && account.password_changed_at.is_some()
                    && account.reset_code_digest.is_none()
                    && account.reset_code_expires_at.is_none()
                    && !account.reset_verified
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = service(repository, notifier);
        let token = service
            .reset_password("a@x.com", "brand-new-password".to_string())
            .await
            .expect("reset failed");

        assert!(test_issuer().verify(&token).is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_without_verify() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository.expect_find_by_email().times(1).returning(|_| {
            let mut account = test_account("$argon2id$hash");
            account.reset_code_digest = Some(auth::reset::digest("123456"));
            account.reset_code_expires_at = Some(Utc::now() + Duration::minutes(5));
            account.reset_verified = false;
            Ok(Some(account))
        });
        repository.expect_update().times(0);

        let service = service(repository, notifier);
        let result = service
            .reset_password("a@x.com", "new-password".to_string())
            .await;
        assert!(matches!(result, Err(AccountError::ResetNotVerified)));
    }

    #[tokio::test]
    async fn test_reset_password_verified_but_window_expired() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository.expect_find_by_email().times(1).returning(|_| {
            let mut account = test_account("$argon2id$hash");
            account.reset_code_digest = Some(auth::reset::digest("123456"));
            account.reset_code_expires_at = Some(Utc::now() - Duration::minutes(1));
            account.reset_verified = true;
            Ok(Some(account))
        });
        repository.expect_update().times(0);

        let service = service(repository, notifier);
        let result = service
            .reset_password("a@x.com", "new-password".to_string())
            .await;
        assert!(matches!(result, Err(AccountError::ResetNotVerified)));
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, notifier);
        let result = service
            .reset_password("nobody@x.com", "new-password".to_string())
            .await;
        assert!(matches!(result, Err(AccountError::NotFoundByEmail(_))));
    }

    #[tokio::test]
    async fn test_change_my_password_stamps_and_reissues_token() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        let account = test_account("$argon2id$old_hash");
        let account_id = account.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == account_id)
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        repository
            .expect_update()
            .withf(|account| {
                account.password_changed_at.is_some()
                    && account.password_hash != "$argon2id$old_hash"
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = service(repository, notifier);
        let result = service
            .change_my_password(&account_id, "new-password".to_string())
            .await
            .expect("change failed");

        assert!(result.account.password_changed_at.is_some());
        let claims = test_issuer().verify(&result.token).expect("bad token");
        assert_eq!(claims.sub, account_id.to_string());
    }

    #[tokio::test]
    async fn test_update_account_rederives_slug() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        let account = test_account("$argon2id$hash");
        let account_id = account.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));
        repository
            .expect_update()
            .withf(|account| {
                account.name.as_str() == "Bea Jones"
                    && account.slug == "bea-jones"
                    && account.role == Role::Manager
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = service(repository, notifier);
        let command = UpdateAccountCommand {
            name: Some(DisplayName::new("Bea Jones".to_string()).unwrap()),
            email: None,
            role: Some(Role::Manager),
        };

        let updated = service
            .update_account(&account_id, command)
            .await
            .expect("update failed");
        assert_eq!(updated.slug, "bea-jones");
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, notifier);
        let result = service.get_account(&AccountId::new()).await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }
}
