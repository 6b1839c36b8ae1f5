//! SMTP Email Service Implementation
//!
//! Production delivery over STARTTLS via `lettre`'s tokio transport.

use chrono::Utc;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

/// SMTP email service implementation
pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl SmtpEmailService {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let host = config
            .smtp_host
            .clone()
            .ok_or_else(|| EmailError::Configuration("SMTP_HOST is required".to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|e| EmailError::Configuration(format!("Invalid SMTP host {}: {}", host, e)))?
            .port(config.smtp_port);

        if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        tracing::info!(host = %host, port = config.smtp_port, "SMTP transport configured");

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }

    /// Convert email message to a MIME message
    fn build_message(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|e| EmailError::Validation(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| EmailError::Validation(format!("Invalid recipient address: {}", e)))?;

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone());

        let built = match &message.body_html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.body_text.clone(),
                html.clone(),
            )),
            None => builder.body(message.body_text.clone()),
        };

        built.map_err(|e| EmailError::Validation(format!("Failed to build message: {}", e)))
    }
}

#[async_trait::async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        let email = self.build_message(&message)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| EmailError::Delivery(format!("SMTP send failed: {}", e)))?;

        let message_id = response
            .message()
            .next()
            .map(|line| line.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::info!(to = %message.to, message_id = %message_id, "Email sent via SMTP");

        Ok(EmailReceipt {
            message_id,
            sent_at: Utc::now(),
            provider: "smtp".to_string(),
            metadata: message.metadata,
        })
    }

    fn default_from(&self) -> String {
        self.config.default_from.clone()
    }

    fn frontend_domain(&self) -> &str {
        &self.config.frontend_domain
    }
}
