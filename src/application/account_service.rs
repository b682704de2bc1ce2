use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::data::user_repository::{NewUser, UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{AccountUpdateRequest, LoginRequest, RegisterRequest, User};
use crate::media::ProfileImageStore;

/// Registration, login and account updates. Every operation takes the acting
/// principal explicitly; there is no ambient current-user state.
pub struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an account. The storage layer's unique constraints decide
    /// duplicate username/email races; no pre-check is made here.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;

        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        };
        self.repo.create_user(new_user).await
    }

    /// Checks credentials by email and returns the authenticated principal.
    /// Session establishment is the caller's concern.
    pub async fn login(&self, req: LoginRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_email(&req.email).await? {
            Some(user_creds) => user_creds,
            None => {
                // стремимся к одинаковому времени проверки если user не найден
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;

        Ok(user_creds.user)
    }

    /// Updates username/email for the acting user. Uniqueness is re-checked
    /// only for fields that actually differ from the stored values, so a
    /// user resubmitting their current username or email always succeeds.
    pub async fn update_account(
        &self,
        actor_id: i64,
        req: AccountUpdateRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;

        let stored = self
            .repo
            .get_user(actor_id)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {actor_id}")))?;

        let mut patch = UserPatch::default();
        if req.username != stored.username {
            // fast path only; the unique index remains the authoritative guard
            if self.repo.find_by_username(&req.username).await?.is_some() {
                return Err(DomainError::DuplicateUsername);
            }
            patch.username = Some(req.username);
        }
        if req.email != stored.email {
            if self.repo.find_by_email(&req.email).await?.is_some() {
                return Err(DomainError::DuplicateEmail);
            }
            patch.email = Some(req.email);
        }

        if patch.is_empty() {
            return Ok(stored);
        }

        self.repo
            .update_user(actor_id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {actor_id}")))
    }

    /// Runs an upload through the image pipeline and assigns the generated
    /// filename to the acting user. The user row is only touched after the
    /// file is durably written; the previous picture stays on disk.
    pub async fn update_profile_image(
        &self,
        actor_id: i64,
        images: &ProfileImageStore,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<User, DomainError> {
        let filename = images.store(bytes, original_filename).await?;

        let patch = UserPatch {
            image_file: Some(filename),
            ..UserPatch::default()
        };
        self.repo
            .update_user(actor_id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {actor_id}")))
    }

    pub fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::AccountService;
    use crate::data::user_repository::{NewUser, UserCredentials, UserPatch, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{
        AccountUpdateRequest, DEFAULT_IMAGE_FILE, LoginRequest, RegisterRequest, User,
    };

    #[derive(Clone)]
    struct StoredUser {
        user: User,
        password_hash: String,
    }

    /// Behavioral in-memory repository enforcing the same uniqueness rules
    /// as the SQLite implementation.
    #[derive(Clone, Default)]
    struct InMemoryUserRepo {
        users: Arc<Mutex<Vec<StoredUser>>>,
    }

    impl InMemoryUserRepo {
        fn stored(&self, id: i64) -> Option<StoredUser> {
            self.users
                .lock()
                .expect("users mutex poisoned")
                .iter()
                .find(|stored| stored.user.id == id)
                .cloned()
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            let mut users = self.users.lock().expect("users mutex poisoned");
            if users.iter().any(|s| s.user.username == input.username) {
                return Err(DomainError::DuplicateUsername);
            }
            if users.iter().any(|s| s.user.email == input.email) {
                return Err(DomainError::DuplicateEmail);
            }
            let user = User::new(
                users.len() as i64 + 1,
                input.username,
                input.email,
                DEFAULT_IMAGE_FILE,
                Utc::now(),
            )
            .expect("new user must be valid");
            users.push(StoredUser {
                user: user.clone(),
                password_hash: input.password_hash,
            });
            Ok(user)
        }

        async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
            Ok(self.stored(id).map(|stored| stored.user))
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .users
                .lock()
                .expect("users mutex poisoned")
                .iter()
                .find(|stored| stored.user.username == username)
                .map(|stored| UserCredentials {
                    user: stored.user.clone(),
                    password_hash: stored.password_hash.clone(),
                }))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .users
                .lock()
                .expect("users mutex poisoned")
                .iter()
                .find(|stored| stored.user.email == email)
                .map(|stored| UserCredentials {
                    user: stored.user.clone(),
                    password_hash: stored.password_hash.clone(),
                }))
        }

        async fn update_user(
            &self,
            id: i64,
            patch: UserPatch,
        ) -> Result<Option<User>, DomainError> {
            let mut users = self.users.lock().expect("users mutex poisoned");
            let Some(stored) = users.iter_mut().find(|stored| stored.user.id == id) else {
                return Ok(None);
            };
            if let Some(username) = patch.username {
                stored.user.username = username;
            }
            if let Some(email) = patch.email {
                stored.user.email = email;
            }
            if let Some(image_file) = patch.image_file {
                stored.user.image_file = image_file;
            }
            Ok(Some(stored.user.clone()))
        }
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "very-secure-password".to_string(),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let repo = InMemoryUserRepo::default();
        let service = AccountService::new(repo.clone());

        let user = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .expect("register must succeed");

        assert_eq!(user.username, "alice");
        assert_eq!(user.image_file, DEFAULT_IMAGE_FILE);

        let stored = repo.stored(user.id).expect("user must be stored");
        assert_ne!(stored.password_hash, "very-secure-password");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn register_duplicate_username_fails() {
        let repo = InMemoryUserRepo::default();
        let service = AccountService::new(repo);

        service
            .register(register_request("alice", "a@example.com"))
            .await
            .expect("first register must succeed");

        let err = service
            .register(register_request("alice", "b@example.com"))
            .await
            .expect_err("duplicate username must fail");
        assert!(matches!(err, DomainError::DuplicateUsername));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let service = AccountService::new(InMemoryUserRepo::default());

        let req = LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let service = AccountService::new(InMemoryUserRepo::default());
        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .expect("register must succeed");

        let req = LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_principal_for_valid_credentials() {
        let service = AccountService::new(InMemoryUserRepo::default());
        let registered = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .expect("register must succeed");

        let req = LoginRequest {
            email: "Alice@Example.com".to_string(),
            password: "very-secure-password".to_string(),
        };

        let user = service.login(req).await.expect("login must succeed");
        assert_eq!(user.id, registered.id);
    }

    #[tokio::test]
    async fn update_account_with_own_values_is_a_no_op() {
        let service = AccountService::new(InMemoryUserRepo::default());
        let user = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .expect("register must succeed");

        let req = AccountUpdateRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        };

        let updated = service
            .update_account(user.id, req)
            .await
            .expect("resubmitting own values must not be a duplicate");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "alice@example.com");
    }

    #[tokio::test]
    async fn update_account_rejects_taken_username() {
        let service = AccountService::new(InMemoryUserRepo::default());
        service
            .register(register_request("alice", "alice@example.com"))
            .await
            .expect("register must succeed");
        let bob = service
            .register(register_request("bob", "bob@example.com"))
            .await
            .expect("register must succeed");

        let req = AccountUpdateRequest {
            username: "alice".to_string(),
            email: "bob@example.com".to_string(),
        };

        let err = service
            .update_account(bob.id, req)
            .await
            .expect_err("taken username must be rejected");
        assert!(matches!(err, DomainError::DuplicateUsername));
    }

    #[tokio::test]
    async fn update_account_changes_only_submitted_differences() {
        let repo = InMemoryUserRepo::default();
        let service = AccountService::new(repo.clone());
        let user = service
            .register(register_request("alice", "alice@example.com"))
            .await
            .expect("register must succeed");

        let req = AccountUpdateRequest {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
        };

        let updated = service
            .update_account(user.id, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.email, "alice@example.com");
        assert_eq!(updated.image_file, DEFAULT_IMAGE_FILE);
    }
}
