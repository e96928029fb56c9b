//! In-memory model of one scanned video and its metadata.

use nfoforge_common::paths::SidecarPaths;
use nfoforge_common::{FileLayout, HdrClass, SidecarStatus, VideoCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Provider key of the default `uniqueid`.
pub const TMDB_ID_KEY: &str = "tmdb";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub score: f64,
    pub votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: String,
    /// Billing order.
    pub order: u32,
    /// Absolute URL of the profile image, empty when unknown.
    pub thumb: String,
}

/// Descriptive metadata of a movie or show, as stored in its NFO.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataDetail {
    pub title: String,
    pub original_title: String,
    pub rating: Rating,
    pub plot: String,
    /// Provider name to provider id, e.g. `tmdb => 603`.
    pub unique_ids: BTreeMap<String, String>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    /// Writer credits.
    pub credits: Vec<String>,
    pub director: String,
    pub premiered: String,
    pub studios: Vec<String>,
    pub actors: Vec<Actor>,
    /// Movie-set name for movies discovered inside a set directory.
    pub set_name: Option<String>,

    // TV only
    pub season_number: u32,
    pub is_ended: bool,
    /// Episode files in playback order.
    pub episode_paths: Vec<PathBuf>,
    /// Episodes whose NFO is present and well-formed.
    pub episode_nfo_count: usize,
}

impl MetadataDetail {
    /// Drop the list fields a scrape rebuilds from scratch.
    pub fn clear_lists(&mut self) {
        self.genres.clear();
        self.countries.clear();
        self.credits.clear();
        self.studios.clear();
        self.actors.clear();
    }
}

/// One physical video asset and the state of its sidecar files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub category: VideoCategory,
    /// The video file, or the show directory for TV.
    pub path: PathBuf,
    pub layout: FileLayout,
    pub hdr: HdrClass,
    pub nfo_status: SidecarStatus,
    pub poster_status: SidecarStatus,
    pub fanart_status: SidecarStatus,
    pub clearlogo_status: SidecarStatus,
    pub sidecars: SidecarPaths,
    pub detail: MetadataDetail,
}

impl VideoRecord {
    /// A movie (or movie-set member) record for `video`.
    pub fn movie(category: VideoCategory, video: &Path, layout: FileLayout) -> Self {
        Self::with_sidecars(category, video, layout, SidecarPaths::for_movie(video))
    }

    /// A TV show record for `show_dir` with its ordered episode files.
    pub fn show(show_dir: &Path, episodes: Vec<PathBuf>) -> Self {
        let mut record = Self::with_sidecars(
            VideoCategory::TvShow,
            show_dir,
            FileLayout::InFolder,
            SidecarPaths::for_show(show_dir),
        );
        record.detail.season_number = 1;
        record.detail.episode_paths = episodes;
        record
    }

    fn with_sidecars(
        category: VideoCategory,
        path: &Path,
        layout: FileLayout,
        sidecars: SidecarPaths,
    ) -> Self {
        Self {
            category,
            path: path.to_path_buf(),
            layout,
            hdr: HdrClass::Unknown,
            nfo_status: SidecarStatus::Missing,
            poster_status: SidecarStatus::Missing,
            fanart_status: SidecarStatus::Missing,
            clearlogo_status: SidecarStatus::Missing,
            sidecars,
            detail: MetadataDetail::default(),
        }
    }

    pub fn is_tv(&self) -> bool {
        self.category == VideoCategory::TvShow
    }

    /// The file whose streams decide the HDR class: the movie itself or the
    /// first episode of a show.
    pub fn hdr_source(&self) -> Option<&Path> {
        if self.is_tv() {
            self.detail.episode_paths.first().map(PathBuf::as_path)
        } else {
            Some(&self.path)
        }
    }

    /// The TMDB id stored in the record's NFO, if any.
    pub fn tmdb_id(&self) -> Option<&str> {
        self.detail
            .unique_ids
            .get(TMDB_ID_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// NFO and poster both matched, and for TV every episode has its NFO.
    pub fn is_meta_completed(&self) -> bool {
        let base = self.nfo_status.is_matched() && self.poster_status.is_matched();
        if self.is_tv() {
            base && self.detail.episode_nfo_count == self.detail.episode_paths.len()
        } else {
            base
        }
    }
}
