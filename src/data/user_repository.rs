use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

/// A user together with its stored password hash. Hashes never appear on
/// [`User`] itself; they only travel through this pair during credential
/// checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update of mutable user fields. `None` leaves the stored value
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_file: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.image_file.is_none()
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. The storage layer's unique constraints are the
    /// authoritative guard against concurrent registrations; violations map
    /// to [`DomainError::DuplicateUsername`] / [`DomainError::DuplicateEmail`].
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, DomainError>;
}
