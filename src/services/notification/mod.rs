mod email;

pub use email::SmtpGateway;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Mail templates the admin lifecycle can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Welcome message for a newly created admin
    Create,
    /// Account-changed message for an edited admin
    Update,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Create => "emails.create",
            Template::Update => "emails.update",
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mailbox a notification is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub address: String,
    pub name: String,
}

/// Mailbox a notification is sent from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sender {
    pub address: String,
    pub name: String,
}

/// Data for the welcome template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub url: String,
    pub root: String,
    pub password: Option<String>,
}

/// Data for the account-updated template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    pub editor_first_name: String,
    pub editor_last_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
    pub url: String,
    pub root: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Create(CreatePayload),
    Update(UpdatePayload),
}

/// A fully addressed templated message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub template: Template,
    pub to: Recipient,
    pub from: Sender,
    pub subject: String,
    pub payload: Payload,
}

impl Notification {
    /// Plain-text body rendered from the payload
    pub fn render_text(&self) -> String {
        match &self.payload {
            Payload::Create(p) => {
                let mut body = format!(
                    "{} {} has created an admin account for you.\n\n\
                     Login: {}\nEmail: {}\n",
                    p.first_name, p.last_name, p.url, p.email
                );
                if let Some(password) = &p.password {
                    body.push_str(&format!("Password: {}\n", password));
                }
                body.push_str(&format!("\n{}\n", p.root));
                body
            }
            Payload::Update(p) => {
                let mut body = format!(
                    "{} {} has updated your admin account.\n\n\
                     Name: {} {}\nLogin: {}\nEmail: {}\n",
                    p.editor_first_name, p.editor_last_name, p.first_name, p.last_name, p.url, p.email
                );
                if let Some(password) = &p.password {
                    body.push_str(&format!("Password: {}\n", password));
                }
                body.push_str(&format!("\n{}\n", p.root));
                body
            }
        }
    }
}

/// Delivers templated notifications
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}
