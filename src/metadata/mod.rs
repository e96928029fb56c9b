//! Metadata providers and the scrape pipeline.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and the provider response types.
//! - [`providers`] -- Concrete provider implementations (TMDB).
//! - [`convert`] -- Mapping provider responses onto record metadata.
//! - [`images`] -- Artwork selection and download.
//! - [`scrape`] -- The staged scrape pipeline for single records.

pub mod convert;
pub mod images;
pub mod provider;
pub mod providers;
pub mod scrape;

pub use images::{Artwork, DownloadError};
pub use provider::{ImageTarget, MetadataProvider, ProviderError};
pub use providers::TmdbProvider;
pub use scrape::{ScrapeError, ScrapeSettings, Scraper};
