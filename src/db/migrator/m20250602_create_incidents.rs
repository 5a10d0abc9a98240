use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Incidents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incidents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incidents::Title).string().not_null())
                    .col(ColumnDef::new(Incidents::Description).text().null())
                    .col(
                        ColumnDef::new(Incidents::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Incidents::Year).integer().null())
                    .col(ColumnDef::new(Incidents::Type).string().null())
                    .col(ColumnDef::new(Incidents::Status).string().null())
                    .col(ColumnDef::new(Incidents::Date).string().null())
                    .col(ColumnDef::new(Incidents::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Incidents::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Public listing filters on this on every request
        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_published")
                    .table(Incidents::Table)
                    .col(Incidents::Published)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Incidents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Incidents {
    Table,
    Id,
    Title,
    Description,
    Published,
    Year,
    Type,
    Status,
    Date,
    CreatedAt,
    UpdatedAt,
}
