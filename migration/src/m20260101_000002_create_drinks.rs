use sea_orm_migration::prelude::*;

use crate::m20260101_000001_create_users::Users;

#[derive(DeriveIden)]
enum Drinks {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Price,
    Category,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Drinks::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Drinks::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Drinks::Description).text().null())
                    .col(ColumnDef::new(Drinks::Price).big_integer().not_null())
                    .col(ColumnDef::new(Drinks::Category).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Drinks::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Drinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Drinks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_drinks_owner")
                            .from(Drinks::Table, Drinks::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // unique (owner_id, name)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_drinks_owner_name")
                    .table(Drinks::Table)
                    .col(Drinks::OwnerId)
                    .col(Drinks::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Drinks::Table).to_owned())
            .await?;
        Ok(())
    }
}
