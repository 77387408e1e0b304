use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create periodic_jobs table
        manager
            .create_table(
                Table::create()
                    .table(PeriodicJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PeriodicJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PeriodicJobs::SpiderName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PeriodicJobs::ScrapeType).string().not_null())
                    .col(ColumnDef::new(PeriodicJobs::UseProxies).boolean().not_null().default(false))
                    .col(ColumnDef::new(PeriodicJobs::SaveToFeed).boolean().not_null().default(false))
                    .col(ColumnDef::new(PeriodicJobs::SaveToDb).boolean().not_null().default(false))
                    .col(ColumnDef::new(PeriodicJobs::Keywords).json().not_null())
                    .col(ColumnDef::new(PeriodicJobs::SelectedCountries).json().not_null())
                    .col(ColumnDef::new(PeriodicJobs::RepeatTime).integer().not_null().default(0))
                    .col(ColumnDef::new(PeriodicJobs::Enabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(PeriodicJobs::DateStarted).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PeriodicJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PeriodicJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_periodic_jobs_enabled")
                    .table(PeriodicJobs::Table)
                    .col(PeriodicJobs::Enabled)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PeriodicJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PeriodicJobs {
    Table,
    Id,
    SpiderName,
    ScrapeType,
    UseProxies,
    SaveToFeed,
    SaveToDb,
    Keywords,
    SelectedCountries,
    RepeatTime,
    Enabled,
    DateStarted,
    CreatedAt,
    UpdatedAt,
}
