//! Test helpers and utilities for integration testing.
//!
//! Provides a migrated in-memory database, a gateway that records what it was asked
//! to send, and shortcuts for building admins and form submissions.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use steward::config::database::DatabaseConfig;
use steward::config::mail::MailConfig;
use steward::config::{Config, LogFormat};
use steward::config::site::SiteConfig;
use steward::error::{AppError, Result};
use steward::models::admin;
use steward::schemas::{AdminInput, CurrentActor};
use steward::services::notification::{Notification, NotificationGateway};
use steward::services::AdminLifecycle;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    steward::db::connect_with_url("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

pub fn test_site() -> SiteConfig {
    SiteConfig {
        name: "Acme".to_string(),
        root_url: "https://acme.test".to_string(),
        admin_dir: "admin".to_string(),
    }
}

pub fn test_mail() -> MailConfig {
    MailConfig {
        from_address: "noreply@acme.test".to_string(),
        from_name: "Acme Admin".to_string(),
        smtp_host: "localhost".to_string(),
        smtp_port: 2525,
        smtp_username: String::new(),
        smtp_password: String::new(),
        use_tls: false,
    }
}

/// Full configuration around the test site and mail settings
pub fn test_config() -> Config {
    Config {
        site: test_site(),
        mail: test_mail(),
        database: DatabaseConfig {
            database_url: "sqlite::memory:".to_string(),
        },
        version: "test".to_string(),
        log_level: "debug".to_string(),
        log_format: LogFormat::Text,
    }
}

/// Gateway that keeps every notification instead of sending it
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A gateway whose every send fails
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, notification: &Notification) -> Result<()> {
        if self.fail {
            return Err(AppError::Notification("SMTP relay unavailable".to_string()));
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub gateway: Arc<RecordingGateway>,
    pub lifecycle: AdminLifecycle,
    pub actor: CurrentActor,
}

/// Fresh database with a signed-in "Root Admin" actor
pub async fn setup() -> TestContext {
    setup_with_gateway(RecordingGateway::new()).await
}

pub async fn setup_with_gateway(gateway: Arc<RecordingGateway>) -> TestContext {
    let db = create_test_db().await;
    let lifecycle = AdminLifecycle::new(db.clone(), &test_site(), &test_mail(), gateway.clone());

    let root = lifecycle
        .create(&bootstrap_actor(), &input("Root", "Admin", "root@acme.test", "rootpass1"))
        .await
        .expect("Failed to create actor");

    TestContext {
        db,
        gateway,
        lifecycle,
        actor: CurrentActor::from(root.admin),
    }
}

/// Actor used only to create the first admin
pub fn bootstrap_actor() -> CurrentActor {
    CurrentActor {
        id: 0,
        first_name: "System".to_string(),
        last_name: "Bootstrap".to_string(),
        email: "system@acme.test".to_string(),
    }
}

/// A valid create submission with matching confirmation
pub fn input(first: &str, last: &str, email: &str, password: &str) -> AdminInput {
    AdminInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        password: Some(password.to_string()),
        confirm_password: Some(password.to_string()),
        image: None,
        send_email: false,
    }
}

/// An edit submission that leaves the password alone
pub fn edit(model: &admin::Model) -> AdminInput {
    AdminInput {
        first_name: model.first_name.clone(),
        last_name: model.last_name.clone(),
        email: model.email.clone(),
        password: None,
        confirm_password: None,
        image: None,
        send_email: false,
    }
}
