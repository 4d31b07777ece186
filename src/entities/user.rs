//! User entity - Account record with password helpers

use super::enums::UserRole;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub business_name: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hashed = User::hash_password("RahasiaUMKM1").unwrap();
        let user = User {
            user_id: 1,
            email: "siti@warung.id".to_string(),
            display_name: "Siti".to_string(),
            business_name: None,
            password: hashed,
            role: UserRole::User,
            created_at: Utc::now(),
        };
        assert!(user.verify_password("RahasiaUMKM1"));
        assert!(!user.verify_password("salah"));
        assert!(!user.is_admin());
    }
}
