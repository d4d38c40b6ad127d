//! Validation rules and password storage for admin accounts.
//!
//! Rules are plain data: [`rules_for`] builds the rule set for a new or an
//! existing admin, [`RuleSet::check`] evaluates everything that needs no
//! database, and [`validate`] adds the uniqueness lookups on top.

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::models::admin;
use crate::models::prelude::*;
use crate::schemas::AdminInput;
use crate::services::security::hash_password;

/// File extensions accepted for the profile image
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];

/// Form fields that carry validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Image,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Image => "image",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
        }
    }

    /// Human readable name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "first name",
            Field::LastName => "last name",
            Field::Image => "image",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm password",
        }
    }

    fn value<'a>(&self, input: &'a AdminInput) -> Option<&'a str> {
        match self {
            Field::FirstName => Some(input.first_name.as_str()),
            Field::LastName => Some(input.last_name.as_str()),
            Field::Image => input.image.as_deref(),
            Field::Email => Some(input.email.as_str()),
            Field::Password => input.password.as_deref(),
            Field::ConfirmPassword => input.confirm_password.as_deref(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single constraint on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Must be present and not blank
    Required,
    /// Only validate the field when it was submitted at all
    Sometimes,
    /// Required when the other field is present
    RequiredWith(Field),
    /// Must equal the other field
    Same(Field),
    /// Must be a well-formed email address
    Email,
    /// Must name an image file
    Image,
    /// Must not collide with another admin's email, ignoring `except`
    Unique { except: Option<i64> },
}

impl Constraint {
    /// Implicit constraints still run when the value is blank
    fn is_implicit(&self) -> bool {
        matches!(self, Constraint::Required | Constraint::RequiredWith(_))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "required"),
            Constraint::Sometimes => write!(f, "sometimes"),
            Constraint::RequiredWith(other) => write!(f, "required_with:{}", other),
            Constraint::Same(other) => write!(f, "same:{}", other),
            Constraint::Email => write!(f, "email"),
            Constraint::Image => write!(f, "image"),
            Constraint::Unique { except: None } => write!(f, "unique:admins,email"),
            Constraint::Unique { except: Some(id) } => write!(f, "unique:admins,email,{}", id),
        }
    }
}

/// Whether rules are being built for a new or an already persisted admin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    New,
    Existing(i64),
}

/// Field to constraints mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<Field, Vec<Constraint>>,
}

impl RuleSet {
    pub fn constraints(&self, field: Field) -> &[Constraint] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: Field, constraint: Constraint) -> bool {
        self.constraints(field).contains(&constraint)
    }

    /// Whether the field must be present and non-blank
    pub fn requires(&self, field: Field) -> bool {
        self.has(field, Constraint::Required)
    }

    /// The uniqueness exclusion for a field, if it has a unique constraint
    pub fn unique_except(&self, field: Field) -> Option<Option<i64>> {
        self.constraints(field).iter().find_map(|c| match c {
            Constraint::Unique { except } => Some(*except),
            _ => None,
        })
    }

    /// Pipe-delimited rule string for a field, e.g. `required|email`
    pub fn describe(&self, field: Field) -> String {
        self.constraints(field)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.rules.keys().copied()
    }

    /// Evaluate every constraint that does not need the database
    pub fn check(&self, input: &AdminInput) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        for (field, constraints) in &self.rules {
            let value = field.value(input);

            if constraints.contains(&Constraint::Sometimes) && value.is_none() {
                continue;
            }

            let blank = value.map(|v| v.trim().is_empty()).unwrap_or(true);

            for constraint in constraints {
                if blank && !constraint.is_implicit() {
                    continue;
                }
                if let Some(message) = violation(*field, constraint, value, input) {
                    errors.add(*field, message);
                }
            }
        }

        errors
    }
}

/// Message for a failed constraint, or `None` when it holds
fn violation(
    field: Field,
    constraint: &Constraint,
    value: Option<&str>,
    input: &AdminInput,
) -> Option<String> {
    let present = |v: Option<&str>| v.map(|v| !v.trim().is_empty()).unwrap_or(false);

    match constraint {
        Constraint::Required if !present(value) => {
            Some(format!("The {} field is required.", field.label()))
        }
        Constraint::RequiredWith(other) if present(other.value(input)) && !present(value) => {
            Some(format!(
                "The {} field is required when {} is present.",
                field.label(),
                other.label()
            ))
        }
        Constraint::Same(other) if value != other.value(input) => Some(format!(
            "The {} and {} must match.",
            field.label(),
            other.label()
        )),
        Constraint::Email if !value.map(is_email).unwrap_or(false) => {
            Some(format!("The {} must be a valid email address.", field.label()))
        }
        Constraint::Image if !value.map(is_image_reference).unwrap_or(false) => {
            Some(format!("The {} must be an image.", field.label()))
        }
        _ => None,
    }
}

fn is_email(value: &str) -> bool {
    value.trim().to_string().validate_email()
}

fn is_image_reference(reference: &str) -> bool {
    reference
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Rules shared by every admin form submission
pub fn base_rules() -> RuleSet {
    let mut rules = BTreeMap::new();
    rules.insert(Field::FirstName, vec![Constraint::Required]);
    rules.insert(Field::LastName, vec![Constraint::Required]);
    rules.insert(Field::Image, vec![Constraint::Image]);
    rules.insert(
        Field::Email,
        vec![
            Constraint::Required,
            Constraint::Email,
            Constraint::Unique { except: None },
        ],
    );
    rules.insert(Field::Password, vec![Constraint::Required]);
    rules.insert(
        Field::ConfirmPassword,
        vec![
            Constraint::Sometimes,
            Constraint::RequiredWith(Field::Password),
            Constraint::Same(Field::Password),
        ],
    );
    RuleSet { rules }
}

/// Build the rule set for a submission.
///
/// Existing admins may leave the password blank, and their own row is
/// ignored by the email uniqueness check.
pub fn rules_for(target: RuleTarget) -> RuleSet {
    let mut rules = base_rules();

    if let RuleTarget::Existing(id) = target {
        rules.rules.remove(&Field::Password);

        if let Some(email) = rules.rules.get_mut(&Field::Email) {
            for constraint in email.iter_mut() {
                if let Constraint::Unique { except } = constraint {
                    *except = Some(id);
                }
            }
        }
    }

    rules
}

/// Evaluate the full rule set, including uniqueness lookups
pub async fn validate<C>(db: &C, rules: &RuleSet, input: &AdminInput) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut errors = rules.check(input);

    for field in rules.fields() {
        let Some(except) = rules.unique_except(field) else {
            continue;
        };
        let Some(value) = field.value(input).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        if errors.get(field).is_some() {
            continue;
        }
        if email_taken(db, value, except).await? {
            errors.add(field, format!("The {} has already been taken.", field.label()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Stored form of an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Case-insensitive match on the email column
pub fn email_matches(email: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(admin::Column::Email))).eq(normalize_email(email))
}

/// Whether another admin already uses this email, ignoring case
pub async fn email_taken<C>(db: &C, email: &str, except: Option<i64>) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut query = Admin::find().filter(email_matches(email));
    if let Some(id) = except {
        query = query.filter(admin::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Replace a changed password with its hash.
///
/// Only `ActiveValue::Set` counts as changed; values loaded from the table
/// are `Unchanged` and are left alone, so a stored hash is never re-hashed.
/// Returns whether hashing happened.
pub fn hash_if_changed(password: &mut ActiveValue<String>) -> Result<bool> {
    let plain = match password {
        ActiveValue::Set(plain) => plain.clone(),
        _ => return Ok(false),
    };
    *password = ActiveValue::Set(hash_password(&plain)?);
    Ok(true)
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<Field, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: Field) -> Option<&[String]> {
        self.0.get(&field).map(Vec::as_slice)
    }

    pub fn has(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[String])> {
        self.0.iter().map(|(f, m)| (*f, m.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{}: {}", field, m)))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
