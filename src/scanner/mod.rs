//! Filesystem scanner.
//!
//! Walks the configured roots of one category, classifies what it finds into
//! [`VideoRecord`]s and checks the sidecars of each record. Scans run on a
//! blocking thread and poll a [`CancellationToken`] between entries.

pub mod discover;
pub mod episodes;
pub mod sidecar;

use crate::nfo::apply_nfo;
use crate::record::VideoRecord;
use nfoforge_common::paths::episode_nfo_path;
use nfoforge_common::{HdrClass, VideoCategory};
use nfoforge_probe::HdrProber;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use episodes::{parse_episode_number, sort_episodes};
pub use sidecar::{check_image, check_nfo, is_valid_image};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan cancelled")]
    Cancelled,

    #[error("scan worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Counters shared between a running scan and status readers.
#[derive(Debug, Default)]
pub struct ScanProgress {
    found: AtomicUsize,
    processed: AtomicUsize,
}

impl ScanProgress {
    pub fn reset(&self) {
        self.found.store(0, Ordering::Relaxed);
        self.processed.store(0, Ordering::Relaxed);
    }

    pub fn found(&self) -> usize {
        self.found.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub(crate) fn set_found(&self, n: usize) {
        self.found.store(n, Ordering::Relaxed);
    }

    pub(crate) fn advance(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Scanner for discovering videos and checking their sidecars.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    prober: HdrProber,
}

impl Scanner {
    pub fn new(prober: HdrProber) -> Self {
        Self { prober }
    }

    pub fn prober(&self) -> &HdrProber {
        &self.prober
    }

    /// Discover and check every record of `category` under `roots`.
    ///
    /// Records come back in discovery order. A cancelled scan returns
    /// [`ScanError::Cancelled`] and whatever it had collected is dropped.
    pub fn scan(
        &self,
        category: VideoCategory,
        roots: &[PathBuf],
        force_hdr_probe: bool,
        progress: &ScanProgress,
        cancel: &CancellationToken,
    ) -> Result<Vec<VideoRecord>, ScanError> {
        progress.reset();
        let mut records = Vec::new();

        for root in roots {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            if !root.is_dir() {
                warn!(category = %category, path = %root.display(), "Library root is not a directory, skipping");
                continue;
            }

            debug!(category = %category, path = %root.display(), "Scanning library root");
            match category {
                VideoCategory::Movie => discover::movies(root, cancel, &mut records)?,
                VideoCategory::MovieSet => discover::movie_sets(root, cancel, &mut records)?,
                VideoCategory::TvShow => discover::shows(root, cancel, &mut records)?,
            }
        }

        progress.set_found(records.len());

        for record in &mut records {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            self.check_status(record, force_hdr_probe);
            progress.advance();
        }

        info!(category = %category, records = records.len(), "Scan complete");
        Ok(records)
    }

    /// Refresh the sidecar statuses of one record.
    ///
    /// A matching NFO is parsed into `record.detail` straight away. The HDR
    /// class is probed only when forced or when the NFO did not match.
    pub fn check_status(&self, record: &mut VideoRecord, force_hdr_probe: bool) {
        let (nfo_status, root) = check_nfo(&record.sidecars.nfo);
        record.nfo_status = nfo_status;
        if let Some(root) = root {
            apply_nfo(record, &root);
        }

        record.poster_status = check_image(&record.sidecars.poster);
        record.fanart_status = check_image(&record.sidecars.fanart);
        record.clearlogo_status = check_image(&record.sidecars.clearlogo);

        if record.is_tv() {
            record.detail.episode_nfo_count = record
                .detail
                .episode_paths
                .iter()
                .filter(|ep| check_nfo(&episode_nfo_path(ep)).0.is_matched())
                .count();
        }

        if force_hdr_probe || !record.nfo_status.is_matched() {
            self.probe_hdr(record);
        }
    }

    /// Probe the HDR class of a record that has not been probed yet.
    pub fn resolve_hdr(&self, record: &mut VideoRecord) {
        if record.hdr == HdrClass::Unknown {
            self.probe_hdr(record);
        }
    }

    fn probe_hdr(&self, record: &mut VideoRecord) {
        if let Some(source) = record.hdr_source() {
            record.hdr = self.prober.probe_or_sdr(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfoforge_common::SidecarStatus;

    fn scanner() -> Scanner {
        Scanner::new(HdrProber::new(Some(PathBuf::from(
            "/nonexistent/nfoforge-test/ffprobe",
        ))))
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let progress = ScanProgress::default();
        let records = scanner()
            .scan(
                VideoCategory::Movie,
                &[PathBuf::from("/nonexistent/nfoforge-test/movies")],
                false,
                &progress,
                &CancellationToken::new(),
            )
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(progress.processed(), 0);
    }

    #[test]
    fn test_probe_failure_degrades_to_sdr() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Movie.X.mkv"), b"not a video").unwrap();

        let progress = ScanProgress::default();
        let records = scanner()
            .scan(
                VideoCategory::Movie,
                &[dir.path().to_path_buf()],
                false,
                &progress,
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nfo_status, SidecarStatus::Missing);
        assert_eq!(records[0].poster_status, SidecarStatus::Missing);
        assert_eq!(records[0].hdr, HdrClass::Sdr);
        assert_eq!(progress.found(), 1);
        assert_eq!(progress.processed(), 1);
    }

    #[test]
    fn test_matched_nfo_skips_hdr_probe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.mkv"), b"x").unwrap();
        std::fs::write(dir.path().join("A.nfo"), "<movie><title>A</title></movie>").unwrap();

        let records = scanner()
            .scan(
                VideoCategory::Movie,
                &[dir.path().to_path_buf()],
                false,
                &ScanProgress::default(),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(records[0].nfo_status, SidecarStatus::Matched);
        assert_eq!(records[0].detail.title, "A");
        assert_eq!(records[0].hdr, HdrClass::Unknown);
    }

    #[test]
    fn test_resolve_hdr_probes_once() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("A.mkv");
        std::fs::write(&video, b"x").unwrap();
        let mut record = VideoRecord::movie(
            VideoCategory::Movie,
            &video,
            nfoforge_common::FileLayout::Standalone,
        );

        scanner().resolve_hdr(&mut record);
        assert_eq!(record.hdr, HdrClass::Sdr);

        record.hdr = HdrClass::Hdr10;
        scanner().resolve_hdr(&mut record);
        assert_eq!(record.hdr, HdrClass::Hdr10);
    }
}
