//! Trait definition and types for metadata providers.
//!
//! The response types mirror the subset of the TMDB v3 JSON shapes the scrape
//! pipeline consumes. Every field has a serde default so a sparse or partially
//! null response still decodes.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from a single provider request.
///
/// Request paths are recorded without their query string so API keys never
/// end up in logs or API responses.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Named {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieDetail {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub original_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(deserialize_with = "null_as_default")]
    pub release_date: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub poster_path: Option<String>,
    pub imdb_id: Option<String>,
    pub genres: Vec<Named>,
    pub production_countries: Vec<Named>,
    pub production_companies: Vec<Named>,
}

/// One entry of a show's `seasons` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeasonSummary {
    pub season_number: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExternalIds {
    pub imdb_id: Option<String>,
    pub tvdb_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TvDetail {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub original_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_air_date: String,
    /// `Returning Series`, `Ended`, `Canceled`, ...
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub poster_path: Option<String>,
    pub genres: Vec<Named>,
    pub production_countries: Vec<Named>,
    pub production_companies: Vec<Named>,
    pub seasons: Vec<SeasonSummary>,
    pub external_ids: Option<ExternalIds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeasonDetail {
    pub season_number: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub episodes: Vec<Episode>,
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CastMember {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub character: String,
    pub order: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub known_for_department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrewMember {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageEntry {
    /// Path fragment such as `/abc123.jpg`.
    #[serde(deserialize_with = "null_as_default")]
    pub file_path: String,
    pub iso_639_1: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageSet {
    pub posters: Vec<ImageEntry>,
    pub backdrops: Vec<ImageEntry>,
    pub logos: Vec<ImageEntry>,
}

/// What an image listing is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Movie(u64),
    Tv(u64),
    Season { tv_id: u64, season: u32 },
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// An external movie/TV metadata source.
///
/// Implementations are shared across tasks behind an `Arc`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has credentials configured.
    fn is_available(&self) -> bool;

    /// Language tag sent with detail requests, e.g. `zh-CN`.
    fn language(&self) -> &str;

    /// Absolute URL for an image path fragment.
    fn image_url(&self, path: &str) -> String;

    async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ProviderError>;

    async fn movie_credits(&self, id: u64) -> Result<Credits, ProviderError>;

    /// Show detail including its season list and external ids.
    async fn tv_detail(&self, id: u64) -> Result<TvDetail, ProviderError>;

    async fn tv_credits(&self, id: u64) -> Result<Credits, ProviderError>;

    async fn season_detail(&self, tv_id: u64, season: u32) -> Result<SeasonDetail, ProviderError>;

    /// Image listing restricted to one image language; `"null"` selects
    /// images without a language.
    async fn images(
        &self,
        target: ImageTarget,
        image_language: &str,
    ) -> Result<ImageSet, ProviderError>;

    /// Fetch the bytes of an image by path fragment.
    async fn download(&self, path: &str) -> Result<Bytes, ProviderError>;
}
