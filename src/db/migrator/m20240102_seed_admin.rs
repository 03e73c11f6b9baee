use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap admin so role-gated routes are usable on a fresh database.
const ADMIN_USERNAME: &str = "admin@waymark.local";
const ADMIN_PASSWORD: &[u8] = b"changeme123";

/// Hash the bootstrap password using Argon2id
fn hash_bootstrap_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(ADMIN_PASSWORD, &salt)
        .expect("Failed to hash bootstrap password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_bootstrap_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Accounts)
            .columns([
                crate::entities::accounts::Column::Username,
                crate::entities::accounts::Column::PasswordHash,
                crate::entities::accounts::Column::Nickname,
                crate::entities::accounts::Column::Roles,
                crate::entities::accounts::Column::ValidFrom,
                crate::entities::accounts::Column::ValidUntil,
            ])
            .values_panic([
                ADMIN_USERNAME.into(),
                password_hash.into(),
                "Administrator".into(),
                r#"["admin"]"#.into(),
                now.into(),
                Option::<String>::None.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Accounts)
            .and_where(
                Expr::col(crate::entities::accounts::Column::Username).eq(ADMIN_USERNAME),
            )
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
