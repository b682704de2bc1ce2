use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

/// Placeholder picture assigned to every account until the owner uploads one.
pub const DEFAULT_IMAGE_FILE: &str = "default.jpg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if password_len < 8 || password_len > 128 {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(DomainError::Validation {
                field: "email",
                message: "must not be empty",
            });
        }

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// Username/email resubmission from the account page. Both fields are always
/// present; the service drops the ones that did not actually change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUpdateRequest {
    pub username: String,
    pub email: String,
}

impl AccountUpdateRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image_file: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        image_file: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;
        let image_file = image_file.into();
        if image_file.is_empty() {
            return Err(DomainError::Validation {
                field: "image_file",
                message: "must not be empty",
            });
        }

        Ok(Self {
            id,
            username,
            email,
            image_file,
            created_at,
        })
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if len < 2 || len > 20 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 2..20 chars",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{
        AccountUpdateRequest, DEFAULT_IMAGE_FILE, RegisterRequest, User, normalize_email,
        normalize_username,
    };
    use chrono::Utc;

    #[test]
    fn user_new_rejects_non_positive_id() {
        let result = User::new(
            0,
            "valid_user",
            "test@example.com",
            DEFAULT_IMAGE_FILE,
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn username_rules_are_applied() {
        assert!(normalize_username("a").is_err());
        assert!(normalize_username("a".repeat(21).as_str()).is_err());
        assert!(normalize_username("ab").is_ok());
        assert!(normalize_username("valid_user").is_ok());
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn account_update_normalizes_fields() {
        let req = AccountUpdateRequest {
            username: "  alice  ".to_string(),
            email: "  ALICE@Example.com ".to_string(),
        };
        let validated = req.validate().expect("must be valid");
        assert_eq!(validated.username, "alice");
        assert_eq!(validated.email, "alice@example.com");
    }
}
