use crate::db::{CredentialRecord, StoreResult};
use crate::entities::{admin_credentials, prelude::*};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

const ADMIN_ROW_ID: i32 = 1;

pub struct CredentialRepository {
    conn: DatabaseConnection,
}

impl CredentialRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self) -> StoreResult<Option<CredentialRecord>> {
        let row = AdminCredentials::find_by_id(ADMIN_ROW_ID)
            .one(&self.conn)
            .await?;

        Ok(row.map(|r| CredentialRecord {
            username: r.username,
            password_hash: r.password_hash,
            updated_at: r.updated_at,
        }))
    }

    /// Upserts the single admin row so username and hash change together.
    pub async fn set(&self, record: &CredentialRecord) -> StoreResult<()> {
        let active = admin_credentials::ActiveModel {
            id: Set(ADMIN_ROW_ID),
            username: Set(record.username.clone()),
            password_hash: Set(record.password_hash.clone()),
            updated_at: Set(record.updated_at.clone()),
        };

        AdminCredentials::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(admin_credentials::Column::Id)
                    .update_columns([
                        admin_credentials::Column::Username,
                        admin_credentials::Column::PasswordHash,
                        admin_credentials::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
