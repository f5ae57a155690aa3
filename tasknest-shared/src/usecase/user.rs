/// Registration and login

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::{UsecaseError, UsecaseResult};
use crate::auth::{
    jwt::{IssuedToken, TokenService},
    password::{hash_password_async, verify_password_async, DECOY_HASH},
};
use crate::models::user::{NewUser, User};
use crate::repository::{RepositoryError, UserRepository};

/// Email and password as submitted by the client
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct Credentials {
    #[validate(email(message = "Must be a valid email address"))]
    #[schema(example = "alice@example.com")]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Must be between 8 and 128 characters"))]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Account operations
#[derive(Clone)]
pub struct UserUsecase {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl UserUsecase {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    /// Creates an account
    ///
    /// The email is trimmed and lowercased before storage. A taken email
    /// yields `Conflict`.
    pub async fn register(&self, credentials: Credentials) -> UsecaseResult<User> {
        let credentials = Credentials {
            email: credentials.email.trim().to_lowercase(),
            password: credentials.password,
        };
        credentials.validate()?;

        if self.repo.find_by_email(&credentials.email).await?.is_some() {
            return Err(email_taken());
        }

        let password_hash = hash_password_async(credentials.password).await?;
        let user = self
            .repo
            .create(NewUser {
                email: credentials.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => email_taken(),
                other => other.into(),
            })?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues a token for the default lifetime
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`
    /// after one Argon2 verification.
    pub async fn login(&self, credentials: Credentials) -> UsecaseResult<IssuedToken> {
        let email = credentials.email.trim().to_lowercase();

        let Some(user) = self.repo.find_by_email(&email).await? else {
            // Same Argon2 cost as a wrong password
            let _ = verify_password_async(credentials.password, DECOY_HASH.to_string()).await;
            warn!("Login attempt for unknown email");
            return Err(UsecaseError::InvalidCredentials);
        };

        if !verify_password_async(credentials.password, user.password_hash).await? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(UsecaseError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id)?;
        info!(user_id = user.id, expires_at = %issued.expires_at, "Issued access token");
        Ok(issued)
    }
}

fn email_taken() -> UsecaseError {
    UsecaseError::Conflict("Email is already registered".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use chrono::Duration;

    fn usecase() -> (UserUsecase, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(
            "user-usecase-test-secret-32-bytes-long",
            Duration::hours(1),
        ));
        let users = UserUsecase::new(Arc::new(InMemoryUserRepository::new()), tokens.clone());
        (users, tokens)
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (users, tokens) = usecase();

        let user = users
            .register(creds(" Alice@Example.com ", "s3cret-password"))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let issued = users
            .login(creds("ALICE@example.com", "s3cret-password"))
            .await
            .unwrap();
        let claims = tokens.validate_token(&issued.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (users, _) = usecase();
        users
            .register(creds("bob@example.com", "right-password"))
            .await
            .unwrap();

        let wrong_password = users
            .login(creds("bob@example.com", "wrong-password"))
            .await
            .unwrap_err();
        let unknown_email = users
            .login(creds("nobody@example.com", "right-password"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, UsecaseError::InvalidCredentials));
        assert!(matches!(unknown_email, UsecaseError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_unknown_email_still_pays_for_a_verify() {
        let (users, _) = usecase();
        users
            .register(creds("frank@example.com", "right-password"))
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let _ = users.login(creds("frank@example.com", "wrong-password")).await;
        let wrong_password = started.elapsed();

        let started = std::time::Instant::now();
        let _ = users.login(creds("nobody@example.com", "wrong-password")).await;
        let unknown_email = started.elapsed();

        assert!(
            unknown_email * 4 >= wrong_password,
            "unknown email took {unknown_email:?}, wrong password took {wrong_password:?}"
        );
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (users, _) = usecase();

        let err = users.register(creds("not-an-email", "long enough")).await.unwrap_err();
        match err {
            UsecaseError::Validation(errors) => assert!(errors.field_errors().contains_key("email")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = users.register(creds("carol@example.com", "short")).await.unwrap_err();
        match err {
            UsecaseError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("password"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (users, _) = usecase();
        users
            .register(creds("dave@example.com", "first-password"))
            .await
            .unwrap();

        let err = users
            .register(creds("DAVE@example.com", "second-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, UsecaseError::Conflict(_)));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let rendered = format!("{:?}", creds("eve@example.com", "hunter2hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
