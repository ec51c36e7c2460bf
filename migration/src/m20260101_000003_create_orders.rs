use sea_orm_migration::prelude::*;

use crate::m20260101_000001_create_users::Users;

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    ReceiptNumber,
    OwnerId,
    CustomerName,
    CustomerEmail,
    Items,
    Subtotal,
    Discount,
    Tax,
    TotalAmount,
    AmountPaid,
    Balance,
    Status,
    PaymentMethod,
    Notes,
    ReceiptPrinted,
    EmailSent,
    ClientLocalId,
    LastSyncedAt,
    SyncStatus,
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
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::OrderNumber).string_len(32).not_null())
                    .col(ColumnDef::new(Orders::ReceiptNumber).string_len(32).not_null())
                    .col(ColumnDef::new(Orders::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::CustomerName).string_len(100).null())
                    .col(ColumnDef::new(Orders::CustomerEmail).string_len(255).null())
                    .col(ColumnDef::new(Orders::Items).json().not_null())
                    .col(ColumnDef::new(Orders::Subtotal).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Discount).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Tax).big_integer().not_null())
                    .col(ColumnDef::new(Orders::TotalAmount).big_integer().not_null())
                    .col(ColumnDef::new(Orders::AmountPaid).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Balance).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Orders::PaymentMethod).string_len(16).not_null())
                    .col(ColumnDef::new(Orders::Notes).text().null())
                    .col(
                        ColumnDef::new(Orders::ReceiptPrinted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::EmailSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Orders::ClientLocalId).string_len(100).null())
                    .col(
                        ColumnDef::new(Orders::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Orders::SyncStatus).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_owner")
                            .from(Orders::Table, Orders::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("uq_orders_order_number", Orders::OrderNumber),
            ("uq_orders_receipt_number", Orders::ReceiptNumber),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Orders::Table)
                        .col(col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        // local ids are minted by each owner's tills
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_orders_owner_client_local_id")
                    .table(Orders::Table)
                    .col(Orders::OwnerId)
                    .col(Orders::ClientLocalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_owner_created_at")
                    .table(Orders::Table)
                    .col(Orders::OwnerId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        Ok(())
    }
}
