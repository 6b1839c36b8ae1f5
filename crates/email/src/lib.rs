//! TeamTact Email Service
//!
//! Notification dispatch for account and team workflows:
//! - SMTP delivery for production
//! - Mock email service for testing and development
//! - Verification, password reset and invitation templates
//!
//! Sends are fire-and-forget from the request's point of view, see [`dispatch`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod content;
pub mod mock;
pub mod smtp;

pub const VERIFY_EMAIL_SUBJECT: &str = "[TeamTact] Verify your email address";
pub const RESET_PASSWORD_SUBJECT: &str = "[TeamTact] Reset your password";
pub const TEAM_INVITATION_SUBJECT: &str = "[TeamTact] You've been invited to join a team!";

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email validation error: {0}")]
    Validation(String),

    #[error("Email delivery error: {0}")]
    Delivery(String),
}

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl EmailMessage {
    /// Create a new email message
    pub fn new(to: String, from: String, subject: String, body_text: String) -> Self {
        Self {
            to,
            from,
            subject,
            body_text,
            body_html: None,
            metadata: HashMap::new(),
        }
    }

    /// Add HTML body content
    pub fn with_html(mut self, body_html: String) -> Self {
        self.body_html = Some(body_html);
        self
    }

    /// Add metadata for tracking
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

/// Email delivery receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
    pub provider: String,
    pub metadata: HashMap<String, String>,
}

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email service provider (smtp, mock)
    pub provider: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    /// Default from address
    pub default_from: String,
    /// Enable email sending (can disable for testing)
    pub enabled: bool,
    /// Frontend base URL used to build links
    pub frontend_domain: String,
}

impl EmailConfig {
    /// Create email config from environment variables
    pub fn from_env() -> Result<Self, EmailError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let smtp_host = std::env::var("SMTP_HOST").ok();
        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| EmailError::Configuration(format!("Invalid SMTP_PORT: {}", port)))?,
            Err(_) => 587,
        };
        let smtp_user = std::env::var("SMTP_USER").ok();
        let smtp_password = std::env::var("SMTP_PASSWORD").ok();

        let default_from =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "no-reply@teamtact.app".to_string());

        let enabled = std::env::var("EMAIL_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let frontend_domain = std::env::var("FRONTEND_DOMAIN")
            .unwrap_or_else(|_| "http://localhost:5173/".to_string());

        Ok(Self {
            provider,
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            default_from,
            enabled,
            frontend_domain,
        })
    }
}

/// Join the frontend base URL, a route and a token query parameter
pub fn frontend_link(frontend_domain: &str, path: &str, token: &str) -> String {
    format!(
        "{}/{}?token={}",
        frontend_domain.trim_end_matches('/'),
        path,
        token
    )
}

/// Email service trait for different implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email message
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Return the default "from" address for outgoing emails
    fn default_from(&self) -> String;

    /// Return the frontend base URL for building links
    fn frontend_domain(&self) -> &str;

    /// Send the link that confirms ownership of an email address
    async fn send_verification_email(
        &self,
        recipient_email: &str,
        fullname: &str,
        code: &str,
        expires_in_hours: i64,
    ) -> Result<EmailReceipt, EmailError> {
        let link = frontend_link(self.frontend_domain(), "verify-email", code);

        let message = EmailMessage::new(
            recipient_email.to_string(),
            self.default_from(),
            VERIFY_EMAIL_SUBJECT.to_string(),
            content::verification_text(fullname, &link, expires_in_hours),
        )
        .with_html(content::verification_html(fullname, &link, expires_in_hours))
        .with_metadata("email_type".to_string(), "email_verification".to_string());

        self.send_email(message).await
    }

    /// Send the password reset link
    async fn send_password_reset(
        &self,
        recipient_email: &str,
        fullname: &str,
        code: &str,
        expires_in_minutes: i64,
    ) -> Result<EmailReceipt, EmailError> {
        let link = frontend_link(self.frontend_domain(), "reset-password", code);

        let message = EmailMessage::new(
            recipient_email.to_string(),
            self.default_from(),
            RESET_PASSWORD_SUBJECT.to_string(),
            content::password_reset_text(fullname, &link, expires_in_minutes),
        )
        .with_html(content::password_reset_html(
            fullname,
            &link,
            expires_in_minutes,
        ))
        .with_metadata("email_type".to_string(), "password_reset".to_string());

        self.send_email(message).await
    }

    /// Send team invitation email
    async fn send_team_invitation(
        &self,
        recipient_email: &str,
        team_name: &str,
        inviter_name: &str,
        role: &str,
        token: &str,
        expires_in_days: i64,
    ) -> Result<EmailReceipt, EmailError> {
        let link = frontend_link(self.frontend_domain(), "accept-invite", token);

        let message = EmailMessage::new(
            recipient_email.to_string(),
            self.default_from(),
            TEAM_INVITATION_SUBJECT.to_string(),
            content::team_invitation_text(inviter_name, team_name, role, &link, expires_in_days),
        )
        .with_html(content::team_invitation_html(
            inviter_name,
            team_name,
            role,
            &link,
            expires_in_days,
        ))
        .with_metadata("email_type".to_string(), "team_invitation".to_string())
        .with_metadata("team_name".to_string(), team_name.to_string())
        .with_metadata("role".to_string(), role.to_string());

        self.send_email(message).await
    }
}

/// Run a send in the background. Failures are logged and dropped; the
/// request that triggered the send never observes them.
pub fn dispatch<F>(kind: &'static str, send: F) -> tokio::task::JoinHandle<()>
where
    F: Future<Output = Result<EmailReceipt, EmailError>> + Send + 'static,
{
    tokio::spawn(async move {
        match send.await {
            Ok(receipt) => {
                tracing::debug!(kind, message_id = %receipt.message_id, "Email dispatched");
            }
            Err(e) => {
                tracing::warn!(kind, error = %e, "Email dispatch failed");
            }
        }
    })
}

/// Email service factory
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create email service based on configuration
    pub fn create(config: EmailConfig) -> Result<Arc<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email service disabled, using mock implementation");
            return Ok(Arc::new(mock::MockEmailService::with_frontend_domain(
                config.frontend_domain,
            )));
        }

        match config.provider.as_str() {
            "smtp" => {
                tracing::info!("Creating SMTP email service");
                Ok(Arc::new(smtp::SmtpEmailService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Arc::new(mock::MockEmailService::with_frontend_domain(
                    config.frontend_domain,
                )))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: smtp, mock",
                provider
            ))),
        }
    }
}
