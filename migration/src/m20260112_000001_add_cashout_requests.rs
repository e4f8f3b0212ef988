use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum CashoutRequests {
    Table,
    Id,
    UserId,
    Amount,
    PaymentMethod,
    AccountDetails,
    Status,
    AdminNote,
    InvoiceReference,
    TransactionReference,
    RequestedAt,
    ProcessedAt,
    ProcessedBy,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CashoutRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashoutRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::PaymentMethod)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::AccountDetails)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashoutRequests::AdminNote).string().null())
                    .col(
                        ColumnDef::new(CashoutRequests::InvoiceReference)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::TransactionReference)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::RequestedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::ProcessedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CashoutRequests::ProcessedBy)
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // admin listings filter on status
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cashout_requests_status")
                    .table(CashoutRequests::Table)
                    .col(CashoutRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cashout_requests_user")
                    .table(CashoutRequests::Table)
                    .col(CashoutRequests::UserId)
                    .to_owned(),
            )
            .await?;

        // At most one pending request per user. A partial unique index makes
        // the existence check and the insert a single atomic step, so two
        // concurrent submissions cannot both slip through. sea-query's index
        // builder has no WHERE clause, hence raw SQL (valid on Postgres and
        // SQLite alike).
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_cashout_requests_user_pending \
                 ON cashout_requests (user_id) WHERE status = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CashoutRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}
