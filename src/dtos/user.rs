//! User DTOs - Data Transfer Objects for accounts and profiles

use crate::entities::{User, UserRole};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

lazy_static! {
    static ref HAS_LETTER: Regex = Regex::new(r"[A-Za-z]").unwrap();
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
}

/// Public view of an account, password never included
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub business_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            email: value.email,
            display_name: value.display_name,
            business_name: value.business_name,
            role: value.role,
            created_at: value.created_at,
        }
    }
}

/// Registration form
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterDTO {
    #[validate(email(message = "Format email tidak valid"))]
    pub email: String,

    #[validate(length(min = 2, max = 60, message = "Nama harus 2 sampai 60 karakter"))]
    pub display_name: String,

    #[validate(length(max = 100, message = "Nama usaha maksimal 100 karakter"))]
    pub business_name: Option<String>,

    #[validate(
        length(min = 8, max = 128, message = "Kata sandi harus 8 sampai 128 karakter"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

/// Login form
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

/// Returned on successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenDTO {
    pub token: String,
    pub user: UserDTO,
}

/// Insert payload for the users table
#[derive(Debug, Clone)]
pub struct CreateUserDTO {
    pub email: String,
    pub display_name: String,
    pub business_name: Option<String>,
    pub password: String,
    pub role: UserRole,
}

/// Profile edit form, only `Some` fields change
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(length(min = 2, max = 60, message = "Nama harus 2 sampai 60 karakter"))]
    pub display_name: Option<String>,

    #[validate(length(max = 100, message = "Nama usaha maksimal 100 karakter"))]
    pub business_name: Option<String>,

    #[validate(
        length(min = 8, max = 128, message = "Kata sandi harus 8 sampai 128 karakter"),
        custom(function = "validate_password_strength")
    )]
    pub password: Option<String>,
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if HAS_LETTER.is_match(password) && HAS_DIGIT.is_match(password) {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some("Kata sandi harus mengandung huruf dan angka".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str) -> RegisterDTO {
        RegisterDTO {
            email: "budi@umkm.id".to_string(),
            display_name: "Budi".to_string(),
            business_name: Some("Keripik Budi".to_string()),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_requires_letters_and_digits() {
        assert!(register("Keripik123").validate().is_ok());
        assert!(register("keripikpedas").validate().is_err());
        assert!(register("12345678").validate().is_err());
        assert!(register("Ab1").validate().is_err());
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let mut dto = register("Keripik123");
        dto.email = "bukan-email".to_string();
        assert!(dto.validate().is_err());
    }
}
