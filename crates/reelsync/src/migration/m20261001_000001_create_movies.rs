//! Initial migration creating the `movies` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    // External TMDB id doubles as the primary key, so a
                    // duplicate insert is a unique violation.
                    .col(
                        ColumnDef::new(Movies::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movies::Name).string().not_null())
                    .col(ColumnDef::new(Movies::Overview).text().null())
                    .col(
                        ColumnDef::new(Movies::Popularity)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Movies::VoteAverage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Movies::VoteCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Movies::ReleaseDate).string().not_null())
                    .col(
                        ColumnDef::new(Movies::Genres)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(Movies::NameSearch)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Movies::OverviewSearch).text().null())
                    .col(
                        ColumnDef::new(Movies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Movies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Range filters hit these columns.
        for (name, column) in [
            ("idx_movies_release_date", Movies::ReleaseDate),
            ("idx_movies_popularity", Movies::Popularity),
            ("idx_movies_vote_average", Movies::VoteAverage),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Movies::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Name,
    Overview,
    Popularity,
    VoteAverage,
    VoteCount,
    ReleaseDate,
    Genres,
    NameSearch,
    OverviewSearch,
    CreatedAt,
    UpdatedAt,
}
