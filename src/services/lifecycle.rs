//! Create/update pipeline for admin accounts.
//!
//! Every write runs the same named stages:
//!
//! 1. `validating`: rules from [`rules_for`], checked inside the transaction
//! 2. `creating` / `updating`: the entity is built or changed
//! 3. `saving`: the model's `before_save` hook hashes a changed password
//! 4. `persisted`: the transaction commits
//! 5. `notifying`: the optional create/update email is dispatched
//!
//! A validation failure drops the transaction before anything is written or
//! sent. A delivery failure happens after commit and is reported in
//! [`SaveOutcome::delivery`] rather than undoing the write.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::fmt;
use std::sync::Arc;

use crate::config::mail::MailConfig;
use crate::config::site::SiteConfig;
use crate::error::{AppError, Result};
use crate::models::admin;
use crate::models::prelude::*;
use crate::schemas::{AdminInput, CurrentActor};
use crate::services::credentials::{
    email_matches, normalize_email, rules_for, validate, RuleTarget,
};
use crate::services::notification::{
    CreatePayload, Notification, NotificationGateway, Payload, Recipient, Sender, Template,
    UpdatePayload,
};
use crate::services::security::verify_password;
use crate::state::DbConn;

/// Named stages of an admin write, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Creating,
    Updating,
    Saving,
    Persisted,
    Notifying,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Creating => "creating",
            Stage::Updating => "updating",
            Stage::Saving => "saving",
            Stage::Persisted => "persisted",
            Stage::Notifying => "notifying",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to the optional notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The request did not ask for an email
    NotRequested,
    Sent,
    /// The gateway rejected the message; the admin was still saved
    Failed(String),
}

/// Result of a successful create or update
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub admin: admin::Model,
    pub delivery: Delivery,
}

/// Runs admin writes and their side effects
#[derive(Clone)]
pub struct AdminLifecycle {
    db: DbConn,
    site: SiteConfig,
    sender: Sender,
    gateway: Arc<dyn NotificationGateway>,
}

impl AdminLifecycle {
    pub fn new(
        db: DbConn,
        site: &SiteConfig,
        mail: &MailConfig,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            db,
            site: site.clone(),
            sender: Sender {
                address: mail.from_address.clone(),
                name: mail.from_name.clone(),
            },
            gateway,
        }
    }

    /// Create a new admin from a form submission
    pub async fn create(&self, actor: &CurrentActor, input: &AdminInput) -> Result<SaveOutcome> {
        let txn = self.db.begin().await?;

        Self::validating(&txn, RuleTarget::New, input).await?;
        let model = Self::creating(input);
        let saved = Self::saving(&txn, model, true).await?;

        txn.commit().await?;
        trace_stage(Stage::Persisted, Some(saved.id));
        tracing::info!(admin_id = saved.id, actor_id = actor.id, "Admin created");

        let delivery = if input.send_email {
            self.deliver(self.send_create_email(actor, input).await)
        } else {
            Delivery::NotRequested
        };

        Ok(SaveOutcome {
            admin: saved,
            delivery,
        })
    }

    /// Apply an edit form submission to an existing admin
    pub async fn update(
        &self,
        actor: &CurrentActor,
        id: i64,
        input: &AdminInput,
    ) -> Result<SaveOutcome> {
        let txn = self.db.begin().await?;

        let existing = Admin::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        Self::validating(&txn, RuleTarget::Existing(existing.id), input).await?;
        let model = Self::updating(existing, input);
        let saved = Self::saving(&txn, model, false).await?;

        txn.commit().await?;
        trace_stage(Stage::Persisted, Some(saved.id));
        tracing::info!(admin_id = saved.id, actor_id = actor.id, "Admin updated");

        let delivery = if input.send_email {
            self.deliver(self.send_update_email(actor, input).await)
        } else {
            Delivery::NotRequested
        };

        Ok(SaveOutcome {
            admin: saved,
            delivery,
        })
    }

    /// Enable or disable login for an admin
    pub async fn set_active(&self, id: i64, active: bool) -> Result<admin::Model> {
        let existing = self.find(id).await?;

        let mut model: admin::ActiveModel = existing.into();
        model.active = Set(active);
        model.updated_at = Set(Utc::now());
        let saved = model.update(&self.db).await?;

        tracing::info!(admin_id = saved.id, active, "Admin login toggled");
        Ok(saved)
    }

    pub async fn find(&self, id: i64) -> Result<admin::Model> {
        Admin::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
    }

    /// All admins, by last name then first name
    pub async fn list_ordered(&self) -> Result<Vec<admin::Model>> {
        let admins = Admin::find()
            .order_by_asc(admin::Column::LastName)
            .order_by_asc(admin::Column::FirstName)
            .all(&self.db)
            .await?;
        Ok(admins)
    }

    /// Check a login attempt. Disabled admins never match.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<admin::Model>> {
        let Some(found) = Admin::find()
            .filter(email_matches(email))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        if !verify_password(password, &found.password) {
            return Ok(None);
        }

        if found.disabled() {
            tracing::debug!(admin_id = found.id, "Rejected login for disabled admin");
            return Ok(None);
        }

        Ok(Some(found))
    }

    /// Send the welcome email for a new admin
    pub async fn send_create_email(&self, actor: &CurrentActor, input: &AdminInput) -> Result<()> {
        let notification = self.create_notification(actor, input);
        self.gateway.send(&notification).await
    }

    /// Send the account-updated email for an edited admin
    pub async fn send_update_email(&self, actor: &CurrentActor, input: &AdminInput) -> Result<()> {
        let notification = self.update_notification(actor, input);
        self.gateway.send(&notification).await
    }

    pub fn create_notification(&self, actor: &CurrentActor, input: &AdminInput) -> Notification {
        Notification {
            template: Template::Create,
            to: recipient(input),
            from: self.sender.clone(),
            subject: format!("Welcome to the {} admin site", self.site.name),
            payload: Payload::Create(CreatePayload {
                first_name: actor.first_name.clone(),
                last_name: actor.last_name.clone(),
                email: normalize_email(&input.email),
                url: self.site.admin_url(),
                root: self.site.root_url.clone(),
                password: input.password().map(str::to_string),
            }),
        }
    }

    pub fn update_notification(&self, actor: &CurrentActor, input: &AdminInput) -> Notification {
        Notification {
            template: Template::Update,
            to: recipient(input),
            from: self.sender.clone(),
            subject: format!(
                "Your {} admin account info has been updated",
                self.site.name
            ),
            payload: Payload::Update(UpdatePayload {
                editor_first_name: actor.first_name.clone(),
                editor_last_name: actor.last_name.clone(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: normalize_email(&input.email),
                password: input.password().map(str::to_string),
                url: self.site.admin_url(),
                root: self.site.root_url.clone(),
            }),
        }
    }

    async fn validating(
        txn: &DatabaseTransaction,
        target: RuleTarget,
        input: &AdminInput,
    ) -> Result<()> {
        trace_stage(Stage::Validating, existing_id(target));
        let rules = rules_for(target);
        validate(txn, &rules, input).await.inspect_err(|e| {
            tracing::debug!(error = %e, "Admin submission rejected");
        })
    }

    fn creating(input: &AdminInput) -> admin::ActiveModel {
        trace_stage(Stage::Creating, None);
        let now = Utc::now();
        admin::ActiveModel {
            first_name: Set(input.first_name.clone()),
            last_name: Set(input.last_name.clone()),
            email: Set(normalize_email(&input.email)),
            password: Set(input.password().unwrap_or_default().to_string()),
            image: Set(input.image().map(str::to_string)),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn updating(existing: admin::Model, input: &AdminInput) -> admin::ActiveModel {
        trace_stage(Stage::Updating, Some(existing.id));

        let mut model: admin::ActiveModel = existing.into();
        model.first_name = Set(input.first_name.clone());
        model.last_name = Set(input.last_name.clone());
        model.email = Set(normalize_email(&input.email));
        if let Some(image) = input.image() {
            model.image = Set(Some(image.to_string()));
        }
        // Any non-empty submission is a new password
        if let Some(password) = input.password() {
            model.password = Set(password.to_string());
        }
        model.updated_at = Set(Utc::now());
        model
    }

    async fn saving(
        txn: &DatabaseTransaction,
        model: admin::ActiveModel,
        insert: bool,
    ) -> Result<admin::Model> {
        trace_stage(Stage::Saving, None);
        let saved = if insert {
            model.insert(txn).await?
        } else {
            model.update(txn).await?
        };
        Ok(saved)
    }

    fn deliver(&self, result: Result<()>) -> Delivery {
        trace_stage(Stage::Notifying, None);
        match result {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                tracing::warn!(error = %e, "Admin notification could not be delivered");
                Delivery::Failed(e.to_string())
            }
        }
    }
}

fn recipient(input: &AdminInput) -> Recipient {
    Recipient {
        address: normalize_email(&input.email),
        name: format!("{} {}", input.first_name, input.last_name)
            .trim()
            .to_string(),
    }
}

fn existing_id(target: RuleTarget) -> Option<i64> {
    match target {
        RuleTarget::New => None,
        RuleTarget::Existing(id) => Some(id),
    }
}

fn trace_stage(stage: Stage, admin_id: Option<i64>) {
    tracing::debug!(stage = %stage, admin_id = ?admin_id, "Admin lifecycle stage");
}
