use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Theater::Table)
                    .if_not_exists()
                    .col(string(Theater::TheaterId).primary_key())
                    .col(string(Theater::Name))
                    .col(string(Theater::OfficialUrl))
                    .col(string(Theater::LastUpdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Showing::Table)
                    .if_not_exists()
                    .col(string(Showing::DetailUrl).primary_key())
                    .col(string(Showing::TheaterId))
                    .col(string(Showing::Title))
                    .col(string_null(Showing::OriginalTitle))
                    .col(integer_null(Showing::ReleaseYear))
                    .col(string_null(Showing::OfficialWebsite))
                    .col(string(Showing::Synopsis))
                    .col(string(Showing::CreatedAt))
                    .col(string(Showing::UpdatedAt))
                    .col(integer_null(Showing::TmdbId))
                    .col(string_null(Showing::TmdbPosterPath))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_showing_theater_id")
                    .table(Showing::Table)
                    .col(Showing::TheaterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Showing::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Theater::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Theater {
    Table,
    TheaterId,
    Name,
    OfficialUrl,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Showing {
    Table,
    DetailUrl,
    TheaterId,
    Title,
    OriginalTitle,
    ReleaseYear,
    OfficialWebsite,
    Synopsis,
    CreatedAt,
    UpdatedAt,
    TmdbId,
    TmdbPosterPath,
}
