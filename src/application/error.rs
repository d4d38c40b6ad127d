use thiserror::Error;

use crate::services::credentials::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl AppError {
    /// Whether the caller can fix this by changing the submitted input
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::NotFound(_)
        )
    }

    /// Field errors, when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credentials::Field;

    #[test]
    fn test_error_display_impl() {
        assert_eq!(
            AppError::NotFound("test".to_string()).to_string(),
            "Not found: test"
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).to_string(),
            "Bad request: test"
        );
        assert_eq!(
            AppError::Notification("test".to_string()).to_string(),
            "Notification error: test"
        );
        assert_eq!(
            AppError::Internal("test".to_string()).to_string(),
            "Internal server error: test"
        );
    }

    #[test]
    fn test_validation_error_display_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.add(Field::Email, "The email field is required.");
        let error = AppError::from(errors);

        assert!(error.to_string().starts_with("Validation failed:"));
        assert!(error.to_string().contains("email"));
        assert!(error.validation_errors().is_some());
    }

    #[test]
    fn test_user_correctable() {
        assert!(AppError::Validation(ValidationErrors::default()).is_user_correctable());
        assert!(AppError::NotFound("x".to_string()).is_user_correctable());
        assert!(!AppError::Notification("x".to_string()).is_user_correctable());
        assert!(!AppError::Internal("x".to_string()).is_user_correctable());
    }

    #[test]
    fn test_json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());
        let app_error: AppError = json_err.unwrap_err().into();
        assert!(matches!(app_error, AppError::Json(_)));
    }

    #[test]
    fn test_db_error_from_conversion() {
        let app_error: AppError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(app_error, AppError::Database(_)));
    }
}
