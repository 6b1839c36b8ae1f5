//! Mock Email Service Implementation
//!
//! Provides in-memory email capture for testing without external dependencies.
//! Integration tests read verification, reset and invitation tokens back out
//! of the captured links.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::{EmailError, EmailMessage, EmailReceipt, EmailService};

lazy_static! {
    static ref TOKEN_PARAM: Regex = Regex::new(r"[?&]token=([A-Za-z0-9_-]+)").unwrap();
}

/// Email captured by the mock service
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub message: EmailMessage,
    pub receipt: EmailReceipt,
    pub captured_at: DateTime<Utc>,
}

impl CapturedEmail {
    /// Value of the `token` query parameter in the first link of the body
    pub fn extract_token(&self) -> Option<String> {
        TOKEN_PARAM
            .captures(&self.message.body_text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// `email_type` metadata, e.g. `team_invitation`
    pub fn email_type(&self) -> Option<&str> {
        self.message.metadata.get("email_type").map(String::as_str)
    }
}

/// Mock email service for testing
#[derive(Debug, Clone)]
pub struct MockEmailService {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    email_by_recipient: Arc<Mutex<HashMap<String, Vec<CapturedEmail>>>>,
    enabled: bool,
    failing: bool,
    frontend_domain: String,
}

impl MockEmailService {
    /// Create a new mock email service
    pub fn new() -> Self {
        Self::with_frontend_domain("http://localhost:5173/".to_string())
    }

    pub fn with_frontend_domain(frontend_domain: String) -> Self {
        Self {
            emails: Arc::new(Mutex::new(Vec::new())),
            email_by_recipient: Arc::new(Mutex::new(HashMap::new())),
            enabled: true,
            failing: false,
            frontend_domain,
        }
    }

    /// Create a disabled mock email service (for testing)
    pub fn new_disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// A service whose every send fails, for exercising fire-and-forget paths
    pub fn new_failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        // A panicking test thread must not hide emails from the others
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get emails sent to a specific recipient
    pub fn get_emails_for_recipient(&self, email: &str) -> Vec<CapturedEmail> {
        Self::lock(&self.email_by_recipient)
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    /// Most recent email of the given `email_type` for a recipient
    pub fn get_latest_email_of_type(&self, email: &str, email_type: &str) -> Option<CapturedEmail> {
        self.get_emails_for_recipient(email)
            .into_iter()
            .filter(|e| e.email_type() == Some(email_type))
            .max_by_key(|e| e.captured_at)
    }

    /// Token from the most recent invitation email for a recipient
    pub fn get_invitation_token_for_email(&self, email: &str) -> Option<String> {
        self.get_latest_email_of_type(email, "team_invitation")
            .and_then(|email| email.extract_token())
    }

    /// Token from the most recent verification email for a recipient
    pub fn get_verification_token_for_email(&self, email: &str) -> Option<String> {
        self.get_latest_email_of_type(email, "email_verification")
            .and_then(|email| email.extract_token())
    }

    /// Token from the most recent password reset email for a recipient
    pub fn get_reset_token_for_email(&self, email: &str) -> Option<String> {
        self.get_latest_email_of_type(email, "password_reset")
            .and_then(|email| email.extract_token())
    }

    /// Check if an invitation email was sent to a specific email address
    pub fn was_invitation_sent_to(&self, email: &str) -> bool {
        self.get_invitation_token_for_email(email).is_some()
    }

    /// Get count of emails sent
    pub fn email_count(&self) -> usize {
        Self::lock(&self.emails).len()
    }

    /// Clear all captured emails
    pub fn clear(&self) {
        Self::lock(&self.emails).clear();
        Self::lock(&self.email_by_recipient).clear();
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        if self.failing {
            return Err(EmailError::Delivery(format!(
                "Mock delivery to {} failed",
                message.to
            )));
        }

        if !self.enabled {
            tracing::warn!("Mock email service disabled, skipping send");
            return Ok(EmailReceipt {
                message_id: format!("disabled-{}", Uuid::new_v4()),
                sent_at: Utc::now(),
                provider: "mock-disabled".to_string(),
                metadata: message.metadata.clone(),
            });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Mock email service capturing email");

        let receipt = EmailReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            sent_at: Utc::now(),
            provider: "mock".to_string(),
            metadata: message.metadata.clone(),
        };

        let captured = CapturedEmail {
            message: message.clone(),
            receipt: receipt.clone(),
            captured_at: Utc::now(),
        };

        Self::lock(&self.emails).push(captured.clone());

        Self::lock(&self.email_by_recipient)
            .entry(message.to)
            .or_default()
            .push(captured);

        Ok(receipt)
    }

    fn default_from(&self) -> String {
        "no-reply@teamtact.app".to_string()
    }

    fn frontend_domain(&self) -> &str {
        &self.frontend_domain
    }
}
