use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::db::temporal::{self, StoreError, TemporalEntity};
use crate::domain::Role;
use crate::entities::accounts;
use crate::entities::prelude::Accounts;

impl TemporalEntity for Accounts {
    fn key_col() -> accounts::Column {
        accounts::Column::Username
    }

    fn valid_from_col() -> accounts::Column {
        accounts::Column::ValidFrom
    }

    fn valid_until_col() -> accounts::Column {
        accounts::Column::ValidUntil
    }
}

/// Account data returned from the repository. The credential hash is never
/// part of this type; callers that need it use `find_active_with_hash`.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub nickname: String,
    pub roles: Vec<Role>,
    pub valid_from: String,
    pub valid_until: Option<String>,
}

/// Fields for a brand-new account version. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub roles: Vec<Role>,
}

/// Replacement fields for an update. `password_hash` is `None` when the
/// existing credential carries over unchanged.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub nickname: String,
    pub roles: Vec<Role>,
    pub password_hash: Option<String>,
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The active version for `username`, hash stripped.
    pub async fn find_active(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let model = temporal::find_active::<Accounts, _>(&self.conn, username).await?;
        model.map(to_account).transpose()
    }

    /// The active version together with its credential hash, for login.
    pub async fn find_active_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, StoreError> {
        let model = temporal::find_active::<Accounts, _>(&self.conn, username).await?;
        model
            .map(|m| {
                let hash = m.password_hash.clone();
                to_account(m).map(|account| (account, hash))
            })
            .transpose()
    }

    /// Insert the first active version for `username`. The existence check is
    /// a fast path; the partial unique index decides races.
    pub async fn create(&self, input: NewAccount) -> Result<Account, StoreError> {
        if temporal::find_active::<Accounts, _>(&self.conn, &input.username)
            .await?
            .is_some()
        {
            return Err(StoreError::Conflict(format!(
                "account '{}' already exists",
                input.username
            )));
        }

        let username = input.username.clone();
        let row = accounts::ActiveModel {
            username: Set(input.username),
            password_hash: Set(input.password_hash),
            nickname: Set(input.nickname),
            roles: Set(encode_roles(&input.roles)?),
            valid_from: Set(temporal::now()),
            valid_until: Set(None),
            ..Default::default()
        };

        let model = row.insert(&self.conn).await.map_err(|e| {
            temporal::conflict_on_unique(e, format!("account '{username}' already exists"))
        })?;

        to_account(model)
    }

    /// Close the active version and insert its replacement in one
    /// transaction, so a concurrent reader never sees zero active rows.
    pub async fn update(
        &self,
        username: &str,
        changes: AccountChanges,
    ) -> Result<Account, StoreError> {
        let txn = self.conn.begin().await?;

        let Some(current) = temporal::find_active::<Accounts, _>(&txn, username).await? else {
            return Err(StoreError::NotFound(format!("account '{username}' not found")));
        };

        let now = temporal::now();
        temporal::close_active::<Accounts, _>(&txn, username, &now).await?;

        let row = accounts::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(changes
                .password_hash
                .unwrap_or(current.password_hash)),
            nickname: Set(changes.nickname),
            roles: Set(encode_roles(&changes.roles)?),
            valid_from: Set(now),
            valid_until: Set(None),
            ..Default::default()
        };

        let model = row.insert(&txn).await?;
        txn.commit().await?;

        to_account(model)
    }

    /// Close the active version without a replacement. A second call for the
    /// same key fails `NotFound`.
    pub async fn soft_delete(&self, username: &str) -> Result<(), StoreError> {
        let now = temporal::now();
        let closed = temporal::close_active::<Accounts, _>(&self.conn, username, &now).await?;
        if closed == 0 {
            return Err(StoreError::NotFound(format!("account '{username}' not found")));
        }
        Ok(())
    }

    /// All versions for `username`, newest first.
    pub async fn history(&self, username: &str) -> Result<Vec<Account>, StoreError> {
        temporal::history::<Accounts, _>(&self.conn, username)
            .await?
            .into_iter()
            .map(to_account)
            .collect()
    }

    pub async fn exists_any_version(&self, username: &str) -> Result<bool, StoreError> {
        temporal::exists_any_version::<Accounts, _>(&self.conn, username).await
    }

    /// All active accounts, ordered by username.
    pub async fn list(&self) -> Result<Vec<Account>, StoreError> {
        Accounts::find()
            .filter(accounts::Column::ValidUntil.is_null())
            .order_by_asc(accounts::Column::Username)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(to_account)
            .collect()
    }
}

fn encode_roles(roles: &[Role]) -> Result<String, StoreError> {
    serde_json::to_string(roles)
        .map_err(|e| StoreError::Database(sea_orm::DbErr::Custom(format!("encode roles: {e}"))))
}

fn to_account(model: accounts::Model) -> Result<Account, StoreError> {
    let roles: Vec<Role> = serde_json::from_str(&model.roles).map_err(|e| {
        StoreError::Database(sea_orm::DbErr::Custom(format!(
            "corrupt roles column for account {}: {e}",
            model.id
        )))
    })?;

    Ok(Account {
        id: model.id,
        username: model.username,
        nickname: model.nickname,
        roles,
        valid_from: model.valid_from,
        valid_until: model.valid_until,
    })
}
