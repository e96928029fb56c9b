//! The scrape pipeline.
//!
//! Each scrape is a strict sequence of stages. The first failing stage aborts
//! the rest and is reported through [`ScrapeError`]; whatever earlier stages
//! already changed on the record or on disk stays changed.

use std::sync::Arc;

use tracing::{debug, info};

use super::convert::{
    apply_credits, apply_movie_detail, apply_tv_detail, season_poster, select_season,
};
use super::images::{collect_artwork, download_artwork, language_chain, Artwork, DownloadError};
use super::provider::{ImageTarget, MetadataProvider, ProviderError, SeasonDetail};
use crate::nfo::{write_episode_nfos, write_record_as_nfo, EpisodeMeta, NfoError};
use crate::record::{VideoRecord, TMDB_ID_KEY};
use nfoforge_common::SidecarStatus;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("get movie detail failed: {0}")]
    MovieDetail(#[source] ProviderError),

    #[error("get tv detail failed: {0}")]
    TvDetail(#[source] ProviderError),

    #[error("get season detail failed: {0}")]
    SeasonDetail(#[source] ProviderError),

    #[error("get credits failed: {0}")]
    Credits(#[source] ProviderError),

    #[error("season {0} not found in provider detail")]
    SeasonNotFound(u32),

    #[error("write nfo file failed: {0}")]
    WriteNfo(#[source] NfoError),

    #[error("write episode nfo failed: {0}")]
    WriteEpisodeNfo(#[source] NfoError),

    #[error("get images failed: {0}")]
    Images(#[source] ProviderError),

    #[error("download image failed: {0}")]
    DownloadImage(#[source] DownloadError),

    #[error("show has ended, no new episodes expected")]
    ShowEnded,

    #[error("provider lists {listed} episodes but {on_disk} are on disk")]
    ProviderBehind { listed: usize, on_disk: usize },

    #[error("record has no tmdb id in its NFO")]
    MissingProviderId,
}

impl ScrapeError {
    /// Stable label of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MovieDetail(_) => "movie_detail",
            Self::TvDetail(_) => "tv_detail",
            Self::SeasonDetail(_) => "season_detail",
            Self::Credits(_) => "credits",
            Self::SeasonNotFound(_) => "season_not_found",
            Self::WriteNfo(_) => "write_nfo",
            Self::WriteEpisodeNfo(_) => "write_episode_nfo",
            Self::Images(_) => "images",
            Self::DownloadImage(_) => "download_image",
            Self::ShowEnded => "show_ended",
            Self::ProviderBehind { .. } => "provider_behind",
            Self::MissingProviderId => "missing_provider_id",
        }
    }
}

/// Pipeline behavior switches.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Append the HDR label to the NFO title of HDR content.
    pub hdr_title_suffix: bool,
    /// Default for episode NFOs when provider and disk counts differ.
    pub force_use_online_tv_meta: bool,
    /// Preferred image languages, tried before unlabelled images.
    pub image_languages: Vec<String>,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            hdr_title_suffix: true,
            force_use_online_tv_meta: false,
            image_languages: vec!["zh".into(), "en".into()],
        }
    }
}

/// Runs scrapes for single records against one provider.
#[derive(Clone)]
pub struct Scraper {
    provider: Arc<dyn MetadataProvider>,
    settings: ScrapeSettings,
}

impl Scraper {
    pub fn new(provider: Arc<dyn MetadataProvider>, settings: ScrapeSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &dyn MetadataProvider {
        self.provider.as_ref()
    }

    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    /// detail → credits → NFO → image listing → image download.
    pub async fn scrape_movie(&self, record: &mut VideoRecord, tmdb_id: u64) -> Result<(), ScrapeError> {
        info!(path = %record.path.display(), tmdb_id, "Scraping movie");
        let provider = self.provider.as_ref();
        record.detail.clear_lists();

        let movie = provider
            .movie_detail(tmdb_id)
            .await
            .map_err(ScrapeError::MovieDetail)?;
        apply_movie_detail(&mut record.detail, &movie);

        let credits = provider
            .movie_credits(tmdb_id)
            .await
            .map_err(ScrapeError::Credits)?;
        apply_credits(&mut record.detail, &credits, |p| provider.image_url(p));

        self.write_nfo(record)?;

        let mut artwork = Artwork {
            poster: movie.poster_path.filter(|p| !p.is_empty()),
            ..Default::default()
        };
        self.fetch_artwork(record, &[ImageTarget::Movie(tmdb_id)], &mut artwork)
            .await?;

        info!(path = %record.path.display(), title = %record.detail.title, "Movie scraped");
        Ok(())
    }

    /// detail → season detail + episode NFOs → credits → NFO → image listing
    /// → image download.
    pub async fn scrape_tv(
        &self,
        record: &mut VideoRecord,
        tmdb_id: u64,
        season: u32,
        force_use_online_meta: bool,
    ) -> Result<(), ScrapeError> {
        info!(path = %record.path.display(), tmdb_id, season, "Scraping TV show");
        let provider = self.provider.as_ref();
        record.detail.clear_lists();
        record.detail.season_number = season;

        let tv = provider
            .tv_detail(tmdb_id)
            .await
            .map_err(ScrapeError::TvDetail)?;
        let summary = select_season(&tv, season).ok_or(ScrapeError::SeasonNotFound(season))?;
        apply_tv_detail(&mut record.detail, &tv, summary);
        let poster = season_poster(&tv, summary);

        let season_detail = provider
            .season_detail(tmdb_id, season)
            .await
            .map_err(ScrapeError::SeasonDetail)?;
        self.write_episodes(record, &season_detail, force_use_online_meta)?;

        let credits = provider
            .tv_credits(tmdb_id)
            .await
            .map_err(ScrapeError::Credits)?;
        apply_credits(&mut record.detail, &credits, |p| provider.image_url(p));

        self.write_nfo(record)?;

        let mut artwork = Artwork {
            poster,
            ..Default::default()
        };
        let targets = [
            ImageTarget::Season {
                tv_id: tmdb_id,
                season,
            },
            ImageTarget::Tv(tmdb_id),
        ];
        self.fetch_artwork(record, &targets, &mut artwork).await?;

        info!(path = %record.path.display(), title = %record.detail.title, "TV show scraped");
        Ok(())
    }

    /// Write NFOs for episodes that appeared since the last scrape.
    ///
    /// Only the current season is fetched. Returns the number of episode
    /// NFOs written.
    pub async fn update_tv(&self, record: &mut VideoRecord) -> Result<usize, ScrapeError> {
        if record.detail.is_ended {
            return Err(ScrapeError::ShowEnded);
        }
        let tmdb_id = stored_provider_id(record)?;
        let season = record.detail.season_number;

        let season_detail = self
            .provider
            .season_detail(tmdb_id, season)
            .await
            .map_err(ScrapeError::SeasonDetail)?;

        let on_disk = record.detail.episode_paths.len();
        if season_detail.episodes.len() < on_disk {
            return Err(ScrapeError::ProviderBehind {
                listed: season_detail.episodes.len(),
                on_disk,
            });
        }

        self.write_episodes(record, &season_detail, self.settings.force_use_online_tv_meta)
    }

    /// Scrape again with the provider id already stored in the record's NFO.
    pub async fn rescrape(&self, record: &mut VideoRecord) -> Result<(), ScrapeError> {
        let tmdb_id = stored_provider_id(record)?;
        if record.is_tv() {
            let season = record.detail.season_number;
            self.scrape_tv(record, tmdb_id, season, self.settings.force_use_online_tv_meta)
                .await
        } else {
            self.scrape_movie(record, tmdb_id).await
        }
    }

    fn write_nfo(&self, record: &mut VideoRecord) -> Result<(), ScrapeError> {
        write_record_as_nfo(
            record,
            &record.sidecars.nfo,
            self.settings.hdr_title_suffix,
            TMDB_ID_KEY,
        )
        .map_err(ScrapeError::WriteNfo)?;
        record.nfo_status = SidecarStatus::Matched;
        Ok(())
    }

    fn write_episodes(
        &self,
        record: &mut VideoRecord,
        season_detail: &SeasonDetail,
        force_use_online_meta: bool,
    ) -> Result<usize, ScrapeError> {
        let season = record.detail.season_number;
        let episodes: Vec<EpisodeMeta> = season_detail
            .episodes
            .iter()
            .map(|e| EpisodeMeta {
                title: e.name.clone(),
                plot: e.overview.clone(),
                season: if e.season_number == 0 { season } else { e.season_number },
                episode: e.episode_number,
            })
            .collect();

        let written = write_episode_nfos(
            &episodes,
            &record.detail.episode_paths,
            season,
            force_use_online_meta,
            self.provider.language(),
        )
        .map_err(ScrapeError::WriteEpisodeNfo)?;

        // Counted right away so a concurrent pass does not rewrite them.
        record.detail.episode_nfo_count = record.detail.episode_paths.len();
        debug!(path = %record.path.display(), written, "Wrote episode NFOs");
        Ok(written)
    }

    async fn fetch_artwork(
        &self,
        record: &mut VideoRecord,
        targets: &[ImageTarget],
        artwork: &mut Artwork,
    ) -> Result<(), ScrapeError> {
        let languages = language_chain(&self.settings.image_languages);
        collect_artwork(self.provider.as_ref(), targets, &languages, artwork)
            .await
            .map_err(ScrapeError::Images)?;

        download_artwork(self.provider.as_ref(), record, artwork)
            .await
            .map_err(ScrapeError::DownloadImage)
    }
}

fn stored_provider_id(record: &VideoRecord) -> Result<u64, ScrapeError> {
    record
        .tmdb_id()
        .and_then(|id| id.trim().parse().ok())
        .ok_or(ScrapeError::MissingProviderId)
}
