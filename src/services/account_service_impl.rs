use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::{AccountChanges, NewAccount, Store};
use crate::domain::Role;
use crate::domain::validation::{self, normalize_key};
use crate::services::account_service::{
    AccountError, AccountService, LoginOutcome, RegisterAccount, UpdateAccount,
};
use crate::services::credentials;
use crate::services::token_service::TokenService;

pub struct SeaOrmAccountService {
    store: Arc<Store>,
    tokens: TokenService,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub fn new(store: Arc<Store>, tokens: TokenService, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(
        &self,
        input: RegisterAccount,
    ) -> Result<crate::db::Account, AccountError> {
        let draft = validation::validate_registration(
            &input.username,
            &input.password,
            &input.nickname,
            &input.roles,
        )?;

        if self.store.find_active_account(&draft.username).await?.is_some() {
            return Err(AccountError::Conflict(format!(
                "account '{}' already exists",
                draft.username
            )));
        }
        if self.store.account_exists_any_version(&draft.username).await? {
            // retired name being reclaimed, allowed by design
            debug!("Username '{}' previously existed, re-registering", draft.username);
        }

        let password_hash = credentials::hash_password(&draft.password, &self.security).await?;

        let account = self
            .store
            .create_account(NewAccount {
                username: draft.username,
                password_hash,
                nickname: draft.nickname,
                roles: draft.roles,
            })
            .await?;

        info!("Registered account '{}'", account.username);
        Ok(account)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, AccountError> {
        let key = normalize_key(username);

        let Some((account, hash)) = self.store.find_account_with_hash(&key).await? else {
            debug!("Login attempt for unknown account '{}'", key);
            return Err(AccountError::NotFound(format!("account '{key}' not found")));
        };

        if !credentials::verify_password(password, &hash).await? {
            debug!("Bad password for account '{}'", key);
            return Err(AccountError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&account.username, &account.nickname, &account.roles)?;

        Ok(LoginOutcome {
            token,
            expires_in: self.tokens.ttl_seconds(),
            account,
        })
    }

    async fn update(
        &self,
        path_username: &str,
        input: UpdateAccount,
    ) -> Result<crate::db::Account, AccountError> {
        let path_key = normalize_key(path_username);
        if normalize_key(&input.username) != path_key {
            return Err(AccountError::Validation(
                "username in body must match username in path".to_string(),
            ));
        }

        let draft =
            validation::validate_account_update(input.password.as_deref(), &input.nickname, &input.roles)?;

        let password_hash = match draft.password {
            Some(password) => Some(credentials::hash_password(&password, &self.security).await?),
            None => None,
        };

        let account = self
            .store
            .update_account(
                &path_key,
                AccountChanges {
                    nickname: draft.nickname,
                    roles: draft.roles,
                    password_hash,
                },
            )
            .await?;

        info!("Updated account '{}'", account.username);
        Ok(account)
    }

    async fn delete(&self, username: &str) -> Result<(), AccountError> {
        let key = normalize_key(username);
        self.store.soft_delete_account(&key).await?;
        info!("Deleted account '{}'", key);
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<crate::db::Account, AccountError> {
        let key = normalize_key(username);
        self.store
            .find_active_account(&key)
            .await?
            .ok_or_else(|| AccountError::NotFound(format!("account '{key}' not found")))
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<crate::db::Account>, AccountError> {
        let mut accounts = self.store.list_accounts().await?;
        if let Some(role) = role {
            accounts.retain(|account| account.roles.contains(&role));
        }
        Ok(accounts)
    }

    async fn history(&self, username: &str) -> Result<Vec<crate::db::Account>, AccountError> {
        let key = normalize_key(username);
        Ok(self.store.account_history(&key).await?)
    }
}
