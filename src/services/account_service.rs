use async_trait::async_trait;
use thiserror::Error;

use crate::db::{Account, StoreError};
use crate::domain::Role;
use crate::domain::validation::ValidationError;
use crate::services::token_service::TokenError;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<ValidationError> for AccountError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration input as received from the wire, pre-validation.
#[derive(Debug, Clone)]
pub struct RegisterAccount {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub roles: Vec<String>,
}

/// Account update input. `password` stays `None` to keep the current
/// credential.
#[derive(Debug, Clone)]
pub struct UpdateAccount {
    pub username: String,
    pub password: Option<String>,
    pub nickname: String,
    pub roles: Vec<String>,
}

/// A successful login: the bearer token plus the account it identifies.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: u64,
    pub account: Account,
}

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Validate, hash, and persist a new account.
    async fn register(&self, input: RegisterAccount) -> Result<Account, AccountError>;

    /// Check credentials and issue a bearer token.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<LoginOutcome, AccountError>;

    /// Replace the active version of the account at `path_username`.
    async fn update(
        &self,
        path_username: &str,
        input: UpdateAccount,
    ) -> Result<Account, AccountError>;

    /// Retire the active version without a replacement.
    async fn delete(&self, username: &str) -> Result<(), AccountError>;

    async fn get(&self, username: &str) -> Result<Account, AccountError>;

    /// Active accounts, optionally narrowed to those carrying `role`.
    async fn list(&self, role: Option<Role>) -> Result<Vec<Account>, AccountError>;

    /// Every version of the account, newest first. Empty if the username was
    /// never registered.
    async fn history(&self, username: &str) -> Result<Vec<Account>, AccountError>;
}
