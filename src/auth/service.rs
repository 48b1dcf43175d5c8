use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::auth::jwt::TokenService;
use crate::auth::password::CredentialHasher;
use crate::db::CredentialStore;
use crate::types::{AppError, AuthError, Result, Role, User, ValidationError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Returns true if `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Registration, login and the development-only dummy login.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    dummy_login_enabled: bool,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        dummy_login_enabled: bool,
    ) -> Self {
        Self {
            credentials,
            hasher: CredentialHasher::new(),
            tokens,
            dummy_login_enabled,
        }
    }

    /// Creates an account. Input is validated before anything is hashed or
    /// stored.
    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<User> {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        let digest = self.hasher.hash_blocking(password.to_string()).await?;
        let user = self.credentials.create_user(email, &digest, role).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");

        Ok(user)
    }

    /// Exchanges email and password for a bearer token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = match self.credentials.find_user_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                tracing::debug!("login for unknown account");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let matches = self
            .hasher
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(user.role)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

        Ok(token)
    }

    /// Issues a token for `role` without any credential check.
    ///
    /// Refused unless enabled in configuration.
    pub fn dummy_login(&self, role: Role) -> Result<String> {
        if !self.dummy_login_enabled {
            return Err(AppError::Forbidden("dummy login is disabled".to_string()));
        }

        tracing::warn!(role = %role, "issuing token through dummy login");
        self.tokens.issue(role)
    }
}
