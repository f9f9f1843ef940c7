use jiff::Timestamp;
use serde::Serialize;

use crate::error::ValidationError;

pub const SYNOPSIS_MAX_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TheaterRecord {
    pub theater_id: String,
    pub name: String,
    pub official_url: String,
    pub last_updated: Timestamp,
}

impl TheaterRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("theater_id", &self.theater_id)?;
        require("name", &self.name)?;
        require("official_url", &self.official_url)?;
        Ok(())
    }
}

/// A title listed at a venue, keyed by its detail page URL.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShowingRecord {
    pub detail_url: String,
    pub theater_id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub release_year: Option<i32>,
    pub official_website: Option<String>,
    pub synopsis: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub tmdb_id: Option<i32>,
    pub tmdb_poster_path: Option<String>,
}

impl ShowingRecord {
    pub fn new(
        theater_id: impl Into<String>,
        detail_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            detail_url: detail_url.into(),
            theater_id: theater_id.into(),
            title: title.into(),
            original_title: None,
            release_year: None,
            official_website: None,
            synopsis: String::new(),
            created_at: now,
            updated_at: now,
            tmdb_id: None,
            tmdb_poster_path: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("detail_url", &self.detail_url)?;
        require("theater_id", &self.theater_id)?;
        require("title", &self.title)?;
        Ok(())
    }

    /// Only the catalog id and poster path are carried over; a candidate
    /// without a poster leaves the existing path alone.
    pub fn apply_candidate(&mut self, candidate: &CatalogCandidate) {
        self.tmdb_id = Some(candidate.id);
        if let Some(poster_path) = &candidate.poster_path {
            self.tmdb_poster_path = Some(poster_path.clone());
        }
    }
}

/// One search-result entry from the external catalog. Never stored on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogCandidate {
    pub id: i32,
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Theater(TheaterRecord),
    Showing(ShowingRecord),
}

impl Record {
    /// The storage key this record is written under.
    pub fn key(&self) -> &str {
        match self {
            Record::Theater(theater) => &theater.theater_id,
            Record::Showing(showing) => &showing.detail_url,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub site: String,
    pub theaters: usize,
    pub showings: usize,
    pub enriched: usize,
    pub rejected: usize,
    pub failed: usize,
}

pub fn truncate_synopsis(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(SYNOPSIS_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
