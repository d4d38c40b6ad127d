use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Notification, NotificationGateway};
use crate::config::mail::MailConfig;
use crate::error::{AppError, Result};

/// Sends notifications over SMTP
pub struct SmtpGateway {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpGateway {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self { transport })
    }
}

/// Build the MIME message for a notification
fn build_message(notification: &Notification) -> Result<Message> {
    let to = mailbox(&notification.to.name, &notification.to.address)
        .ok_or_else(|| AppError::Notification("Invalid recipient email address".to_string()))?;

    let from = mailbox(&notification.from.name, &notification.from.address)
        .ok_or_else(|| AppError::Notification("Invalid from email address".to_string()))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.render_text())
        .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))
}

/// Mailbox with the display name attached when there is one
fn mailbox(name: &str, address: &str) -> Option<Mailbox> {
    let address = address.parse().ok()?;
    let name = name.trim();
    Some(Mailbox::new(
        (!name.is_empty()).then(|| name.to_string()),
        address,
    ))
}

#[async_trait]
impl NotificationGateway for SmtpGateway {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = build_message(notification)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("Failed to send email: {}", e)))?;

        tracing::info!(
            template = %notification.template,
            recipient = %notification.to.address,
            "Notification email sent"
        );
        Ok(())
    }
}
