use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create jobs table
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jobs::SpiderName).string().not_null())
                    .col(ColumnDef::new(Jobs::Status).string().not_null())
                    .col(ColumnDef::new(Jobs::ScrapeType).string().not_null())
                    .col(ColumnDef::new(Jobs::UseProxies).boolean().not_null().default(false))
                    .col(ColumnDef::new(Jobs::SaveToFeed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Jobs::SaveToDb).boolean().not_null().default(false))
                    .col(ColumnDef::new(Jobs::ItemsScraped).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::TaskHandle).uuid())
                    .col(ColumnDef::new(Jobs::FailureReason).string())
                    .col(ColumnDef::new(Jobs::PeriodicJobId).uuid())
                    .col(ColumnDef::new(Jobs::DateStarted).timestamp_with_time_zone())
                    .col(ColumnDef::new(Jobs::DateFinished).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Jobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_status")
                    .table(Jobs::Table)
                    .col(Jobs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_spider_name")
                    .table(Jobs::Table)
                    .col(Jobs::SpiderName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_periodic_job_id")
                    .table(Jobs::Table)
                    .col(Jobs::PeriodicJobId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    SpiderName,
    Status,
    ScrapeType,
    UseProxies,
    SaveToFeed,
    SaveToDb,
    ItemsScraped,
    TaskHandle,
    FailureReason,
    PeriodicJobId,
    DateStarted,
    DateFinished,
    CreatedAt,
    UpdatedAt,
}
