use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::account::errors::NotifierError;
use crate::account::ports::EmailMessage;
use crate::account::ports::Notifier;
use crate::config::SmtpConfig;

/// SMTP-backed email delivery.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, anyhow::Error> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .build();

        let from = config.from.parse()?;

        tracing::info!(host = %config.host, port = config.port, "SMTP notifier initialized");

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| NotifierError::DeliveryFailure(format!("invalid recipient: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| NotifierError::DeliveryFailure(format!("failed to build email: {}", e)))?;

        self.mailer
            .send(email)
            .await
            .map(|_| {
                tracing::debug!(to = %message.to, "Email delivered");
            })
            .map_err(|e| {
                tracing::error!(to = %message.to, error = %e, "Email delivery failed");
                NotifierError::DeliveryFailure(e.to_string())
            })
    }
}
