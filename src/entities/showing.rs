use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "showing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub detail_url: String,
    pub theater_id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub release_year: Option<i32>,
    pub official_website: Option<String>,
    pub synopsis: String,
    pub created_at: String,
    pub updated_at: String,
    pub tmdb_id: Option<i32>,
    pub tmdb_poster_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
