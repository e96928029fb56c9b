use crate::metadata::ScrapeError;
use crate::scanner::ScanError;
use chrono::{DateTime, Utc};
use nfoforge_common::VideoCategory;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("{0} scan or refresh is already running")]
    AlreadyRunning(VideoCategory),

    #[error("{0} scan or refresh is still running, retry later")]
    StillRunning(VideoCategory),

    #[error("{0} library has not been scanned yet")]
    NotYetScanned(VideoCategory),

    #[error("id {id} is out of range, {category} has {len} records")]
    IdOutOfRange {
        category: VideoCategory,
        id: usize,
        len: usize,
    },

    #[error("seasonId is required to scrape a TV show")]
    MissingSeasonId,

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl LibraryError {
    /// Whether the caller may simply retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AlreadyRunning(_) | Self::StillRunning(_))
    }
}

/// Background job flavors. Both share one single-flight permit per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Scan,
    Refresh,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    #[default]
    NeverRun,
    Running,
    Finished,
    Failed,
    Cancelled,
}

/// Outcome counts of a refresh job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RefreshSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failed_paths: Vec<PathBuf>,
    pub skipped_paths: Vec<PathBuf>,
}

/// Latest state of one job slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub summary: Option<RefreshSummary>,
}

/// Per-category job status as served by `/api/scanResult` and
/// `/api/refreshResult`.
///
/// A running job reports its progress but no record count; an idle one
/// reports the record count but no progress.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    #[serde(rename = "VideoType")]
    pub category: VideoCategory,
    #[serde(rename = "ScanStatus")]
    pub status: JobStatus,
    #[serde(rename = "ScanBeginTime", skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "ScanEndTime", skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(rename = "TotalVideoNum", skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(rename = "ProcessedVideoNum", skip_serializing_if = "Option::is_none")]
    pub processed: Option<usize>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "Summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<RefreshSummary>,
}
