use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::Store;
use crate::database::models::{User, UserRole};
use crate::error::AppError;
use crate::services::token::{Principal, TokenService};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        let verified =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await?;
        // A malformed stored hash is treated as a mismatch.
        Ok(verified.unwrap_or(false))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, AppError> {
        let user = match self.store.find_user_by_email(email.trim()).await? {
            Some(user) => user,
            None => {
                log::debug!("Login failed: unknown email");
                return Err(AppError::unauthenticated("Invalid credentials"));
            }
        };

        if !self.verify_password(password, &user.password_hash).await? {
            log::debug!("Login failed: wrong password for user {}", user.id);
            return Err(AppError::unauthenticated("Invalid credentials"));
        }

        let token = self.tokens.issue(&user.id, user.role)?;

        log::info!("User {} logged in", user.id);
        Ok(AuthPayload { token })
    }

    pub async fn me(&self, principal: &Principal) -> Result<User, AppError> {
        self.store
            .find_user_by_id(&principal.id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool, AppError> {
        if new_password.is_empty() {
            return Err(AppError::invalid_argument("New password must not be empty"));
        }

        let user = self.me(principal).await?;
        if !self
            .verify_password(current_password, &user.password_hash)
            .await?
        {
            return Err(AppError::invalid_argument("Invalid current password"));
        }

        let password_hash = self.hash_password(new_password).await?;
        self.store.update_password(&user.id, &password_hash).await?;
        log::info!("User {} changed their password", user.id);
        Ok(true)
    }

    /// Creates a login account, optionally linked to an employee record.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
        employee_id: Option<String>,
    ) -> Result<User, AppError> {
        let password_hash = self.hash_password(password).await?;
        let user = User::new(email.trim().to_string(), password_hash, role, employee_id);
        self.store.create_user(&user).await
    }

    /// Bootstrap admin account; a no-op when the email is already registered.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.store.find_user_by_email(email.trim()).await?.is_some() {
            log::info!("Bootstrap admin {} already exists", email);
            return Ok(());
        }
        let user = self
            .create_account(email, password, UserRole::Admin, None)
            .await?;
        log::info!("Created bootstrap admin {}", user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn service() -> AuthService {
        AuthService::new(
            MemoryStore::new_shared(),
            TokenService::new("unit-test-secret", 1),
            4,
        )
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let auth = service();
        let user = auth
            .create_account("ada@example.com", "hunter2", UserRole::Employee, None)
            .await
            .unwrap();

        let payload = auth.login("ada@example.com", "hunter2").await.unwrap();
        let principal = auth.tokens().verify(&payload.token).unwrap();

        assert_eq!(principal.id, user.id);
        assert_eq!(principal.role, UserRole::Employee);
    }

    #[tokio::test]
    async fn test_login_failures_look_identical() {
        let auth = service();
        auth.create_account("ada@example.com", "hunter2", UserRole::Employee, None)
            .await
            .unwrap();

        let wrong_password = auth.login("ada@example.com", "nope").await.unwrap_err();
        let unknown_email = auth.login("bob@example.com", "hunter2").await.unwrap_err();

        assert_eq!(wrong_password.kind(), ErrorKind::Unauthenticated);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_change_password_requires_current_password() {
        let auth = service();
        let user = auth
            .create_account("ada@example.com", "hunter2", UserRole::Employee, None)
            .await
            .unwrap();
        let principal = Principal {
            id: user.id,
            role: user.role,
        };

        let err = auth
            .change_password(&principal, "wrong", "new-secret")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(
            auth.change_password(&principal, "hunter2", "new-secret")
                .await
                .unwrap()
        );
        assert!(auth.login("ada@example.com", "new-secret").await.is_ok());
        assert!(auth.login("ada@example.com", "hunter2").await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let auth = service();
        auth.ensure_admin("root@example.com", "pw").await.unwrap();
        auth.ensure_admin("root@example.com", "pw").await.unwrap();

        let payload = auth.login("root@example.com", "pw").await.unwrap();
        let principal = auth.tokens().verify(&payload.token).unwrap();
        assert_eq!(principal.role, UserRole::Admin);
    }
}
