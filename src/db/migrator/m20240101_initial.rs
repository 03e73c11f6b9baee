use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Accounts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(WaypointSets)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Waypoints)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Partial unique indexes are the authoritative guard for the
        // single-active-row invariant. sea_query has no builder for the
        // WHERE clause, so these go in as raw statements (valid on both
        // sqlite and postgres).
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_active_username \
             ON accounts (username) WHERE valid_until IS NULL",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_waypoint_sets_active_name \
             ON waypoint_sets (name) WHERE valid_until IS NULL",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_waypoints_set_id ON waypoints (set_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Waypoints).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WaypointSets).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts).to_owned())
            .await?;

        Ok(())
    }
}
