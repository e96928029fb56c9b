use crate::record::{Actor, Rating, VideoRecord};
use nfoforge_common::{HdrClass, SidecarStatus, VideoCategory};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Listing entry for one record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BriefView {
    #[serde(rename = "id")]
    pub id: usize,
    pub video_type: VideoCategory,
    pub video_path: PathBuf,
    pub nfo_status: SidecarStatus,
    pub poster_status: SidecarStatus,
    pub fanart_status: SidecarStatus,
    pub clearlogo_status: SidecarStatus,
    #[serde(rename = "HDRType")]
    pub hdr_type: HdrClass,
    pub nfo_path: PathBuf,
    pub poster_path: PathBuf,
    pub completed: bool,
}

impl BriefView {
    pub fn new(id: usize, record: &VideoRecord) -> Self {
        Self {
            id,
            video_type: record.category,
            video_path: record.path.clone(),
            nfo_status: record.nfo_status,
            poster_status: record.poster_status,
            fanart_status: record.fanart_status,
            clearlogo_status: record.clearlogo_status,
            hdr_type: record.hdr,
            nfo_path: record.sidecars.nfo.clone(),
            poster_path: record.sidecars.poster.clone(),
            completed: record.is_meta_completed(),
        }
    }
}

/// Metadata block of the detailed view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetailView {
    pub title: String,
    pub original_title: String,
    pub ratings: Rating,
    pub plot: String,
    #[serde(rename = "Uniqueid")]
    pub unique_ids: BTreeMap<String, String>,
    pub genre: Vec<String>,
    pub countries: Vec<String>,
    pub credits: Vec<String>,
    pub director: String,
    pub premiered: String,
    pub studio: Vec<String>,
    pub actors: Vec<Actor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(flatten)]
    pub tv: Option<TvDetailView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TvDetailView {
    pub season_number: u32,
    pub status: &'static str,
    pub episode_nfo_count: usize,
    pub episode_count: usize,
    pub episode_paths: Vec<PathBuf>,
}

/// Listing entry plus the NFO-derived metadata when the NFO matched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetailedView {
    #[serde(flatten)]
    pub brief: BriefView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_detail: Option<DetailView>,
}

impl DetailedView {
    pub fn new(id: usize, record: &VideoRecord) -> Self {
        let video_detail = record.nfo_status.is_matched().then(|| {
            let d = &record.detail;
            DetailView {
                title: d.title.clone(),
                original_title: d.original_title.clone(),
                ratings: d.rating.clone(),
                plot: d.plot.clone(),
                unique_ids: d.unique_ids.clone(),
                genre: d.genres.clone(),
                countries: d.countries.clone(),
                credits: d.credits.clone(),
                director: d.director.clone(),
                premiered: d.premiered.clone(),
                studio: d.studios.clone(),
                actors: d.actors.clone(),
                set: d.set_name.clone(),
                tv: record.is_tv().then(|| TvDetailView {
                    season_number: d.season_number,
                    status: if d.is_ended { "Ended" } else { "Continuing" },
                    episode_nfo_count: d.episode_nfo_count,
                    episode_count: d.episode_paths.len(),
                    episode_paths: d.episode_paths.clone(),
                }),
            }
        });

        Self {
            brief: BriefView::new(id, record),
            video_detail,
        }
    }
}
