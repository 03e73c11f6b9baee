use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

pub mod migrator;
pub mod repositories;
pub mod temporal;

pub use repositories::account::{Account, AccountChanges, NewAccount};
pub use repositories::waypoint::{NewWaypointSet, Waypoint, WaypointSet, WaypointSetChanges};
pub use temporal::StoreError;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // sqlite needs the database file to exist before connecting
        if let Some(path_str) = db_url.strip_prefix("sqlite:") {
            if !path_str.starts_with(":memory:") && !path_str.contains("mode=memory") {
                if let Some(parent) = Path::new(path_str).parent() {
                    tokio::fs::create_dir_all(parent).await.ok();
                }
                if !Path::new(path_str).exists() {
                    std::fs::File::create(path_str)?;
                }
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn waypoint_repo(&self) -> repositories::waypoint::WaypointRepository {
        repositories::waypoint::WaypointRepository::new(self.conn.clone())
    }

    // ========== Accounts ==========

    pub async fn create_account(&self, input: NewAccount) -> Result<Account, StoreError> {
        self.account_repo().create(input).await
    }

    pub async fn find_active_account(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.account_repo().find_active(username).await
    }

    pub async fn find_account_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, StoreError> {
        self.account_repo().find_active_with_hash(username).await
    }

    pub async fn update_account(
        &self,
        username: &str,
        changes: AccountChanges,
    ) -> Result<Account, StoreError> {
        self.account_repo().update(username, changes).await
    }

    pub async fn soft_delete_account(&self, username: &str) -> Result<(), StoreError> {
        self.account_repo().soft_delete(username).await
    }

    pub async fn account_history(&self, username: &str) -> Result<Vec<Account>, StoreError> {
        self.account_repo().history(username).await
    }

    pub async fn account_exists_any_version(&self, username: &str) -> Result<bool, StoreError> {
        self.account_repo().exists_any_version(username).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.account_repo().list().await
    }

    // ========== Waypoint sets ==========

    pub async fn create_waypoint_set(
        &self,
        input: NewWaypointSet,
    ) -> Result<WaypointSet, StoreError> {
        self.waypoint_repo().create(input).await
    }

    pub async fn find_active_waypoint_set(
        &self,
        name: &str,
    ) -> Result<Option<WaypointSet>, StoreError> {
        self.waypoint_repo().find_active(name).await
    }

    pub async fn update_waypoint_set(
        &self,
        name: &str,
        changes: WaypointSetChanges,
    ) -> Result<WaypointSet, StoreError> {
        self.waypoint_repo().update(name, changes).await
    }

    pub async fn soft_delete_waypoint_set(&self, name: &str) -> Result<(), StoreError> {
        self.waypoint_repo().soft_delete(name).await
    }

    pub async fn waypoint_set_history(&self, name: &str) -> Result<Vec<WaypointSet>, StoreError> {
        self.waypoint_repo().history(name).await
    }

    pub async fn waypoint_set_exists_any_version(
        &self,
        name: &str,
    ) -> Result<bool, StoreError> {
        self.waypoint_repo().exists_any_version(name).await
    }

    pub async fn list_waypoint_sets(&self) -> Result<Vec<WaypointSet>, StoreError> {
        self.waypoint_repo().list().await
    }
}
