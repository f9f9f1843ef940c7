use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};

use crate::{
    entities::{showing, theater},
    error::AppResult,
    models::{ShowingRecord, TheaterRecord},
};

/// Key-based record storage. Puts replace every column of an existing row
/// with the same key; nothing is read first.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn put_theater(&self, record: &TheaterRecord) -> AppResult<()> {
        let model = theater::ActiveModel {
            theater_id: Set(record.theater_id.clone()),
            name: Set(record.name.clone()),
            official_url: Set(record.official_url.clone()),
            last_updated: Set(record.last_updated.to_string()),
        };

        theater::Entity::insert(model)
            .on_conflict(
                OnConflict::column(theater::Column::TheaterId)
                    .update_columns([
                        theater::Column::Name,
                        theater::Column::OfficialUrl,
                        theater::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn put_showing(&self, record: &ShowingRecord) -> AppResult<()> {
        let model = showing::ActiveModel {
            detail_url: Set(record.detail_url.clone()),
            theater_id: Set(record.theater_id.clone()),
            title: Set(record.title.clone()),
            original_title: Set(record.original_title.clone()),
            release_year: Set(record.release_year),
            official_website: Set(record.official_website.clone()),
            synopsis: Set(record.synopsis.clone()),
            created_at: Set(record.created_at.to_string()),
            updated_at: Set(record.updated_at.to_string()),
            tmdb_id: Set(record.tmdb_id),
            tmdb_poster_path: Set(record.tmdb_poster_path.clone()),
        };

        showing::Entity::insert(model)
            .on_conflict(
                OnConflict::column(showing::Column::DetailUrl)
                    .update_columns([
                        showing::Column::TheaterId,
                        showing::Column::Title,
                        showing::Column::OriginalTitle,
                        showing::Column::ReleaseYear,
                        showing::Column::OfficialWebsite,
                        showing::Column::Synopsis,
                        showing::Column::CreatedAt,
                        showing::Column::UpdatedAt,
                        showing::Column::TmdbId,
                        showing::Column::TmdbPosterPath,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn list_theaters(&self) -> AppResult<Vec<TheaterRecord>> {
        theater::Entity::find()
            .order_by_asc(theater::Column::TheaterId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(TheaterRecord::try_from)
            .collect()
    }

    pub async fn list_showings(&self, theater_id: &str) -> AppResult<Vec<ShowingRecord>> {
        showing::Entity::find()
            .filter(showing::Column::TheaterId.eq(theater_id))
            .order_by_asc(showing::Column::Title)
            .all(&self.db)
            .await?
            .into_iter()
            .map(ShowingRecord::try_from)
            .collect()
    }
}

impl TryFrom<theater::Model> for TheaterRecord {
    type Error = crate::error::AppError;

    fn try_from(row: theater::Model) -> AppResult<Self> {
        Ok(Self {
            theater_id: row.theater_id,
            name: row.name,
            official_url: row.official_url,
            last_updated: row.last_updated.parse()?,
        })
    }
}

impl TryFrom<showing::Model> for ShowingRecord {
    type Error = crate::error::AppError;

    fn try_from(row: showing::Model) -> AppResult<Self> {
        Ok(Self {
            detail_url: row.detail_url,
            theater_id: row.theater_id,
            title: row.title,
            original_title: row.original_title,
            release_year: row.release_year,
            official_website: row.official_website,
            synopsis: row.synopsis,
            created_at: row.created_at.parse()?,
            updated_at: row.updated_at.parse()?,
            tmdb_id: row.tmdb_id,
            tmdb_poster_path: row.tmdb_poster_path,
        })
    }
}
