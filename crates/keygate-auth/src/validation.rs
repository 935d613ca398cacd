//! Registration input validation

use serde::Deserialize;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AuthError, FieldError};

/// Registration request
///
/// Field rules are checked by [`RegistrationRequest::check`] before anything
/// is hashed or written.
#[derive(Clone, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        custom(function = "validate_username_charset")
    )]
    pub username: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(
        length(min = 8, max = 256, message = "Password must be between 8 and 256 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RegistrationRequest {
    /// Run every field rule and collect the failures
    pub fn check(&self) -> Result<(), AuthError> {
        self.validate()
            .map_err(|errors| AuthError::Validation(field_errors(&errors)))
    }
}

/// Only allow alphanumeric characters, underscores, and hyphens
fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Ok(());
    }
    let mut err = ValidationError::new("username_charset");
    err.message = Some(
        "Username can only contain alphanumeric characters, underscores, and hyphens".into(),
    );
    Err(err)
}

/// Require at least one uppercase letter, one lowercase letter and one digit
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let message = if !password.chars().any(char::is_uppercase) {
        "Password must contain at least one uppercase letter"
    } else if !password.chars().any(char::is_lowercase) {
        "Password must contain at least one lowercase letter"
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        "Password must contain at least one digit"
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("password_strength");
    err.message = Some(message.into());
    Err(err)
}

/// Flatten validator output into a stable, sorted list
fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn failed_fields(req: &RegistrationRequest) -> Vec<String> {
        match req.check() {
            Err(AuthError::Validation(fields)) => {
                let mut names: Vec<String> = fields.into_iter().map(|f| f.field).collect();
                names.dedup();
                names
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("alice", "alice@example.com", "Passw0rd").check().is_ok());
        assert!(request("bob_smith-2", "bob@example.org", "Sup3rSecret").check().is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(failed_fields(&request("alice", "alice@example.com", "short1")), ["password"]);
        assert_eq!(failed_fields(&request("alice", "alice@example.com", "Short1")), ["password"]);
        assert_eq!(failed_fields(&request("alice", "alice@example.com", "password1")), ["password"]);
        assert_eq!(failed_fields(&request("alice", "alice@example.com", "PASSWORD1")), ["password"]);
        assert_eq!(failed_fields(&request("alice", "alice@example.com", "Password")), ["password"]);
    }

    #[test]
    fn test_password_strength_messages() {
        let err = validate_password_strength("password1").unwrap_err();
        assert_eq!(
            err.message.unwrap(),
            "Password must contain at least one uppercase letter"
        );
        let err = validate_password_strength("Password").unwrap_err();
        assert_eq!(err.message.unwrap(), "Password must contain at least one digit");
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(failed_fields(&request("al", "alice@example.com", "Passw0rd")), ["username"]);
        assert_eq!(
            failed_fields(&request(&"a".repeat(51), "alice@example.com", "Passw0rd")),
            ["username"]
        );
        assert_eq!(failed_fields(&request("alice smith", "alice@example.com", "Passw0rd")), ["username"]);
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(failed_fields(&request("alice", "not-an-email", "Passw0rd")), ["email"]);
        assert_eq!(failed_fields(&request("alice", "", "Passw0rd")), ["email"]);
    }

    #[test]
    fn test_all_failures_reported() {
        let fields = failed_fields(&request("a", "nope", "x"));
        assert!(fields.contains(&"username".to_string()));
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"password".to_string()));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", request("alice", "alice@example.com", "Passw0rd"));
        assert!(!debug.contains("Passw0rd"));
        assert!(debug.contains("alice"));
    }
}
