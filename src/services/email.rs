// src/services/email.rs
// DOCUMENTATION: Transactional email over SMTP
// PURPOSE: Verification, password reset and claim notifications (best-effort)

use crate::config::Config;
use crate::errors::DirectoryError;
use crate::models::ClaimStatus;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Outgoing message before it is addressed and sent
#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

pub fn verification_email(frontend_url: &str, token: &str) -> EmailContent {
    EmailContent {
        subject: "Verify your KoreaBiz account".to_string(),
        body: format!(
            "Welcome to KoreaBiz Directory!\n\nConfirm your email address:\n{}/verify-email?token={}\n\nThis link expires in 24 hours.",
            frontend_url.trim_end_matches('/'),
            token
        ),
    }
}

pub fn password_reset_email(frontend_url: &str, token: &str) -> EmailContent {
    EmailContent {
        subject: "Reset your KoreaBiz password".to_string(),
        body: format!(
            "We received a request to reset your password.\n\n{}/reset-password?token={}\n\nThis link expires in 1 hour. If you did not ask for it, ignore this email.",
            frontend_url.trim_end_matches('/'),
            token
        ),
    }
}

pub fn claim_submitted_email(enterprise_name: &str, requester_name: &str, requester_email: &str) -> EmailContent {
    EmailContent {
        subject: format!("New ownership claim: {}", enterprise_name),
        body: format!(
            "{} <{}> submitted an ownership claim for \"{}\".\nReview it in the admin dashboard.",
            requester_name, requester_email, enterprise_name
        ),
    }
}

pub fn claim_decision_email(enterprise_name: &str, status: ClaimStatus, notes: Option<&str>) -> EmailContent {
    let outcome = match status {
        ClaimStatus::Approved => "approved. You can now manage the listing",
        ClaimStatus::Rejected => "rejected",
        ClaimStatus::InReview => "now under review",
        ClaimStatus::Submitted => "received",
    };
    let mut body = format!("Your ownership claim for \"{}\" was {}.", enterprise_name, outcome);
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!("\n\nNotes from our team:\n{}", notes));
    }

    EmailContent {
        subject: format!("Your claim for {}", enterprise_name),
        body,
    }
}

/// SMTP mailer
/// DOCUMENTATION: Disabled when SMTP_HOST is unset or in the test environment;
/// a disabled mailer logs and skips every message
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    frontend_url: String,
    admin_notify_email: Option<String>,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        let transport = match config.smtp_host.as_deref() {
            Some(host) if !config.is_test() => match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
                Ok(builder) => {
                    let mut builder = builder.port(config.smtp_port);
                    if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
                        builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                    }
                    Some(builder.build())
                }
                Err(e) => {
                    log::error!("Invalid SMTP configuration for {}: {}", host, e);
                    None
                }
            },
            _ => None,
        };

        if transport.is_none() {
            log::warn!("SMTP not configured, emails will be logged and skipped");
        }

        Self {
            transport,
            from: config.from_email.clone(),
            frontend_url: config.frontend_url.clone(),
            admin_notify_email: config.admin_notify_email.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send(&self, to: &str, content: &EmailContent) -> Result<(), DirectoryError> {
        let Some(transport) = &self.transport else {
            log::info!("Email disabled, skipping \"{}\" to {}", content.subject, to);
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| DirectoryError::InternalError(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| DirectoryError::InvalidInput(format!("Invalid recipient: {}", e)))?)
            .subject(content.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(content.body.clone())
            .map_err(|e| DirectoryError::InternalError(format!("Failed to build email: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| DirectoryError::ExternalServiceError(format!("SMTP send failed: {}", e)))?;

        log::info!("Sent \"{}\" to {}", content.subject, to);
        Ok(())
    }

    /// Send without failing the caller; errors are logged
    async fn send_best_effort(&self, to: &str, content: EmailContent) {
        if let Err(e) = self.send(to, &content).await {
            log::warn!("Email \"{}\" to {} failed: {}", content.subject, to, e);
        }
    }

    pub async fn send_verification(&self, to: &str, token: &str) {
        self.send_best_effort(to, verification_email(&self.frontend_url, token))
            .await;
    }

    pub async fn send_password_reset(&self, to: &str, token: &str) {
        self.send_best_effort(to, password_reset_email(&self.frontend_url, token))
            .await;
    }

    pub async fn notify_claim_submitted(&self, enterprise_name: &str, requester_name: &str, requester_email: &str) {
        let Some(admin) = self.admin_notify_email.as_deref() else {
            return;
        };
        self.send_best_effort(
            admin,
            claim_submitted_email(enterprise_name, requester_name, requester_email),
        )
        .await;
    }

    pub async fn send_claim_decision(
        &self,
        to: &str,
        enterprise_name: &str,
        status: ClaimStatus,
        notes: Option<&str>,
    ) {
        self.send_best_effort(to, claim_decision_email(enterprise_name, status, notes))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_use_frontend_url() {
        let mail = verification_email("https://koreabiz.example/", "abc123");
        assert!(mail.body.contains("https://koreabiz.example/verify-email?token=abc123"));

        let mail = password_reset_email("https://koreabiz.example", "xyz");
        assert!(mail.body.contains("https://koreabiz.example/reset-password?token=xyz"));
    }

    #[test]
    fn test_claim_decision_includes_notes() {
        let mail = claim_decision_email("Seoul Coffee Lab", ClaimStatus::Approved, Some("Welcome aboard"));
        assert!(mail.body.contains("approved"));
        assert!(mail.body.contains("Welcome aboard"));

        let mail = claim_decision_email("Seoul Coffee Lab", ClaimStatus::Rejected, Some("  "));
        assert!(!mail.body.contains("Notes"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_skips() {
        let mut config = Config::for_tests();
        config.smtp_host = Some("smtp.koreabiz.test".to_string());
        let mailer = Mailer::new(&config);

        // test environment never sends
        assert!(!mailer.is_enabled());
        let content = verification_email(&config.frontend_url, "t");
        assert!(mailer.send("user@koreabiz.test", &content).await.is_ok());
    }
}
