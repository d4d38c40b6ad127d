use std::env;

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_address: String,
    pub from_name: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub use_tls: bool,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            from_address: env::var("STEWARD_MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "postmaster@localhost".to_string()),
            from_name: env::var("STEWARD_MAIL_FROM_NAME").unwrap_or_else(|_| "Admin".to_string()),
            smtp_host: env::var("STEWARD_SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("STEWARD_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: env::var("STEWARD_SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("STEWARD_SMTP_PASSWORD").unwrap_or_default(),
            use_tls: env::var("STEWARD_SMTP_TLS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
        }
    }
}
