//! Per-category scan/refresh orchestration.
//!
//! Every category owns one in-memory record list, a single-permit semaphore
//! shared by its scan and refresh jobs, and a status slot per job kind.
//! Jobs run as spawned tasks; status reads are snapshots of a
//! [`watch`] channel and never wait on a running job.

mod types;

pub use types::*;

use crate::config::LibraryConfig;
use crate::metadata::Scraper;
use crate::nfo::{BriefView, DetailedView};
use crate::record::VideoRecord;
use crate::scanner::{ScanError, ScanProgress, Scanner};
use chrono::Utc;
use nfoforge_common::{HdrClass, StatusFilter, VideoCategory};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

struct JobSlot {
    state: watch::Sender<JobSnapshot>,
    progress: Arc<ScanProgress>,
}

impl JobSlot {
    fn new() -> Self {
        let (state, _) = watch::channel(JobSnapshot::default());
        Self {
            state,
            progress: Arc::new(ScanProgress::default()),
        }
    }

    fn snapshot(&self) -> JobSnapshot {
        self.state.borrow().clone()
    }

    fn begin(&self) {
        self.progress.reset();
        self.state.send_replace(JobSnapshot {
            status: JobStatus::Running,
            started_at: Some(Utc::now()),
            ..Default::default()
        });
    }

    fn finish(&self, result: Result<Option<RefreshSummary>, LibraryError>) {
        self.state.send_modify(|s| {
            s.finished_at = Some(Utc::now());
            match result {
                Ok(summary) => {
                    s.status = JobStatus::Finished;
                    s.summary = summary;
                }
                Err(LibraryError::Scan(ScanError::Cancelled)) => {
                    s.status = JobStatus::Cancelled;
                }
                Err(e) => {
                    s.status = JobStatus::Failed;
                    s.error = Some(e.to_string());
                }
            }
        });
    }
}

struct CategoryState {
    category: VideoCategory,
    roots: Vec<PathBuf>,
    permit: Arc<Semaphore>,
    records: RwLock<Vec<VideoRecord>>,
    /// Bumped whenever a scan replaces `records`.
    generation: AtomicU64,
    scanned: AtomicBool,
    scan: JobSlot,
    refresh: JobSlot,
    job_token: Mutex<Option<CancellationToken>>,
}

impl CategoryState {
    fn new(category: VideoCategory, roots: Vec<PathBuf>) -> Self {
        Self {
            category,
            roots,
            permit: Arc::new(Semaphore::new(1)),
            records: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
            scanned: AtomicBool::new(false),
            scan: JobSlot::new(),
            refresh: JobSlot::new(),
            job_token: Mutex::new(None),
        }
    }

    fn slot(&self, kind: JobKind) -> &JobSlot {
        match kind {
            JobKind::Scan => &self.scan,
            JobKind::Refresh => &self.refresh,
        }
    }

    fn is_busy(&self) -> bool {
        self.permit.available_permits() == 0
    }

    /// Readers are turned away while a job holds the permit.
    fn ensure_readable(&self) -> Result<(), LibraryError> {
        if self.is_busy() {
            Err(LibraryError::StillRunning(self.category))
        } else if !self.scanned.load(Ordering::Acquire) {
            Err(LibraryError::NotYetScanned(self.category))
        } else {
            Ok(())
        }
    }

    /// A copy of one record and the list generation it was taken from.
    fn get(&self, id: usize) -> Result<(u64, VideoRecord), LibraryError> {
        let records = self.records.read();
        let generation = self.generation.load(Ordering::Acquire);
        records
            .get(id)
            .cloned()
            .map(|r| (generation, r))
            .ok_or(LibraryError::IdOutOfRange {
                category: self.category,
                id,
                len: records.len(),
            })
    }

    /// Write a record back unless a scan replaced the list meanwhile.
    fn store(&self, id: usize, generation: u64, record: VideoRecord) -> bool {
        let mut records = self.records.write();
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(category = %self.category, id, "Record list replaced, dropping update");
            return false;
        }
        match records.get_mut(id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    fn replace(&self, records: Vec<VideoRecord>) {
        let mut guard = self.records.write();
        *guard = records;
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.scanned.store(true, Ordering::Release);
    }

    fn begin_job(&self, kind: JobKind, parent: &CancellationToken) -> CancellationToken {
        let token = parent.child_token();
        *self.job_token.lock() = Some(token.clone());
        self.slot(kind).begin();
        token
    }

    fn end_job(&self, kind: JobKind, result: Result<Option<RefreshSummary>, LibraryError>) {
        match &result {
            Ok(_) => info!(category = %self.category, ?kind, "Job finished"),
            Err(LibraryError::Scan(ScanError::Cancelled)) => {
                info!(category = %self.category, ?kind, "Job cancelled")
            }
            Err(e) => error!(category = %self.category, ?kind, error = %e, "Job failed"),
        }
        self.job_token.lock().take();
        self.slot(kind).finish(result);
    }

    fn report(&self, kind: JobKind) -> JobReport {
        let slot = self.slot(kind);
        let snapshot = slot.snapshot();
        let running = snapshot.status == JobStatus::Running;

        JobReport {
            category: self.category,
            status: snapshot.status,
            started_at: snapshot.started_at,
            finished_at: snapshot.finished_at.filter(|_| !running),
            total: (!running).then(|| self.records.read().len()),
            processed: running.then(|| slot.progress.processed()),
            error: snapshot.error,
            summary: snapshot.summary,
        }
    }
}

/// The in-memory video library and its background jobs.
pub struct Library {
    movie: Arc<CategoryState>,
    tv: Arc<CategoryState>,
    movie_set: Arc<CategoryState>,
    scanner: Scanner,
    scraper: Scraper,
    shutdown: CancellationToken,
}

impl Library {
    pub fn new(config: &LibraryConfig, scanner: Scanner, scraper: Scraper) -> Self {
        let state = |category: VideoCategory| {
            Arc::new(CategoryState::new(
                category,
                config.roots(category).to_vec(),
            ))
        };
        Self {
            movie: state(VideoCategory::Movie),
            tv: state(VideoCategory::TvShow),
            movie_set: state(VideoCategory::MovieSet),
            scanner,
            scraper,
            shutdown: CancellationToken::new(),
        }
    }

    fn category(&self, category: VideoCategory) -> &Arc<CategoryState> {
        match category {
            VideoCategory::Movie => &self.movie,
            VideoCategory::TvShow => &self.tv,
            VideoCategory::MovieSet => &self.movie_set,
        }
    }

    pub fn scraper(&self) -> &Scraper {
        &self.scraper
    }

    /// Cancelled by [`shutdown`](Self::shutdown); parent of every job token.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    // -----------------------------------------------------------------------
    // Jobs
    // -----------------------------------------------------------------------

    /// Start a scan of `category` in the background.
    pub fn start_scan(
        self: &Arc<Self>,
        category: VideoCategory,
        force_hdr_probe: bool,
    ) -> Result<(), LibraryError> {
        let cat = Arc::clone(self.category(category));
        let permit = cat
            .permit
            .clone()
            .try_acquire_owned()
            .map_err(|_| LibraryError::AlreadyRunning(category))?;

        let token = cat.begin_job(JobKind::Scan, &self.shutdown);
        info!(category = %category, force_hdr_probe, "Scan started");
        tokio::spawn(Arc::clone(self).scan_job(cat, force_hdr_probe, permit, token));
        Ok(())
    }

    /// Start a scan followed by a rescrape of every record with a valid NFO.
    pub fn start_refresh(self: &Arc<Self>, category: VideoCategory) -> Result<(), LibraryError> {
        let cat = Arc::clone(self.category(category));
        let permit = cat
            .permit
            .clone()
            .try_acquire_owned()
            .map_err(|_| LibraryError::AlreadyRunning(category))?;

        let token = cat.begin_job(JobKind::Refresh, &self.shutdown);
        info!(category = %category, "Refresh started");
        tokio::spawn(Arc::clone(self).refresh_job(cat, permit, token));
        Ok(())
    }

    /// Scan `category` in the foreground, waiting for any running job first.
    pub async fn scan_and_wait(
        self: &Arc<Self>,
        category: VideoCategory,
        force_hdr_probe: bool,
    ) -> JobSnapshot {
        let cat = Arc::clone(self.category(category));
        let Ok(permit) = cat.permit.clone().acquire_owned().await else {
            return cat.scan.snapshot();
        };
        if self.shutdown.is_cancelled() {
            return cat.scan.snapshot();
        }

        let token = cat.begin_job(JobKind::Scan, &self.shutdown);
        Arc::clone(self)
            .scan_job(Arc::clone(&cat), force_hdr_probe, permit, token)
            .await;
        cat.scan.snapshot()
    }

    /// Scan every category with configured roots, one after another.
    pub async fn scan_all_and_wait(self: &Arc<Self>, force_hdr_probe: bool) {
        for category in VideoCategory::ALL {
            if self.shutdown.is_cancelled() {
                return;
            }
            if self.category(category).roots.is_empty() {
                debug!(category = %category, "No roots configured, skipping scan");
                continue;
            }
            self.scan_and_wait(category, force_hdr_probe).await;
        }
    }

    async fn scan_job(
        self: Arc<Self>,
        cat: Arc<CategoryState>,
        force_hdr_probe: bool,
        _permit: OwnedSemaphorePermit,
        token: CancellationToken,
    ) {
        let result = self
            .run_scan(&cat, force_hdr_probe, Arc::clone(&cat.scan.progress), token)
            .await
            .map(|_| None);
        cat.end_job(JobKind::Scan, result);
    }

    async fn refresh_job(
        self: Arc<Self>,
        cat: Arc<CategoryState>,
        _permit: OwnedSemaphorePermit,
        token: CancellationToken,
    ) {
        let scan_progress = Arc::new(ScanProgress::default());
        let result = match self.run_scan(&cat, false, scan_progress, token.clone()).await {
            Ok(_) => self.rescrape_all(&cat, &token).await.map(Some),
            Err(e) => Err(e),
        };
        cat.end_job(JobKind::Refresh, result);
    }

    async fn run_scan(
        &self,
        cat: &CategoryState,
        force_hdr_probe: bool,
        progress: Arc<ScanProgress>,
        token: CancellationToken,
    ) -> Result<usize, LibraryError> {
        let scanner = self.scanner.clone();
        let roots = cat.roots.clone();
        let category = cat.category;

        let records = tokio::task::spawn_blocking(move || {
            scanner.scan(category, &roots, force_hdr_probe, &progress, &token)
        })
        .await
        .map_err(ScanError::Join)??;

        let count = records.len();
        cat.replace(records);
        Ok(count)
    }

    async fn rescrape_all(
        &self,
        cat: &CategoryState,
        token: &CancellationToken,
    ) -> Result<RefreshSummary, LibraryError> {
        let generation = cat.generation.load(Ordering::Acquire);
        let records: Vec<VideoRecord> = cat.records.read().clone();
        let progress = &cat.refresh.progress;

        let mut summary = RefreshSummary {
            total: records.len(),
            ..Default::default()
        };

        for (id, mut record) in records.into_iter().enumerate() {
            if token.is_cancelled() {
                return Err(ScanError::Cancelled.into());
            }

            if !record.nfo_status.is_matched() {
                summary.skipped += 1;
                summary.skipped_paths.push(record.path.clone());
                progress.advance();
                continue;
            }

            record = self.resolve_hdr(record).await?;
            match self.scraper.rescrape(&mut record).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    warn!(
                        path = %record.path.display(),
                        stage = e.stage(),
                        error = %e,
                        "Refresh of record failed"
                    );
                    summary.failed += 1;
                    summary.failed_paths.push(record.path.clone());
                }
            }
            cat.store(id, generation, record);
            progress.advance();
        }

        info!(
            category = %cat.category,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Refresh complete"
        );
        Ok(summary)
    }

    /// Probe the HDR class of a record scanned with a matching NFO, so the
    /// title suffix is not lost when its NFO is rewritten.
    async fn resolve_hdr(&self, record: VideoRecord) -> Result<VideoRecord, LibraryError> {
        if !self.scraper.settings().hdr_title_suffix || record.hdr != HdrClass::Unknown {
            return Ok(record);
        }

        let scanner = self.scanner.clone();
        let record = tokio::task::spawn_blocking(move || {
            let mut record = record;
            scanner.resolve_hdr(&mut record);
            record
        })
        .await
        .map_err(ScanError::Join)?;
        Ok(record)
    }

    /// Write episode NFOs for ongoing shows that gained episodes.
    ///
    /// Waits for any running TV job. Per-show failures are logged and
    /// skipped. Returns the number of shows updated.
    pub async fn auto_update_tv(&self) -> usize {
        let cat = Arc::clone(&self.tv);
        let Ok(_permit) = cat.permit.clone().acquire_owned().await else {
            return 0;
        };

        let generation = cat.generation.load(Ordering::Acquire);
        let candidates: Vec<(usize, VideoRecord)> = cat
            .records
            .read()
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.nfo_status.is_matched()
                    && !r.detail.is_ended
                    && r.detail.episode_nfo_count != r.detail.episode_paths.len()
            })
            .map(|(id, r)| (id, r.clone()))
            .collect();

        if candidates.is_empty() {
            debug!("No TV shows need an episode update");
            return 0;
        }

        let mut updated = 0;
        for (id, mut record) in candidates {
            if self.shutdown.is_cancelled() {
                break;
            }
            match self.scraper.update_tv(&mut record).await {
                Ok(written) => {
                    info!(path = %record.path.display(), written, "Updated TV episodes");
                    cat.store(id, generation, record);
                    updated += 1;
                }
                Err(e) => warn!(
                    path = %record.path.display(),
                    stage = e.stage(),
                    error = %e,
                    "TV episode update failed"
                ),
            }
        }
        updated
    }

    /// Cancel the running scan or refresh of `category`, if any.
    pub fn cancel(&self, category: VideoCategory) -> bool {
        match self.category(category).job_token.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every running job and stop background work.
    pub fn shutdown(&self) {
        info!("Library shutting down");
        self.shutdown.cancel();
    }

    /// Wait until the given job of `category` is no longer running.
    pub async fn wait_idle(&self, category: VideoCategory, kind: JobKind) -> JobSnapshot {
        let mut rx = self.category(category).slot(kind).state.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.status != JobStatus::Running || rx.changed().await.is_err() {
                return snapshot;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    pub fn job_status(&self, category: VideoCategory, kind: JobKind) -> JobReport {
        self.category(category).report(kind)
    }

    pub fn all_job_status(&self, kind: JobKind) -> Vec<JobReport> {
        VideoCategory::ALL
            .into_iter()
            .map(|c| self.job_status(c, kind))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Brief views of every record whose completeness passes `filter`.
    pub fn list(
        &self,
        category: VideoCategory,
        filter: StatusFilter,
    ) -> Result<Vec<BriefView>, LibraryError> {
        let cat = self.category(category);
        cat.ensure_readable()?;

        Ok(cat
            .records
            .read()
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.accepts(r.is_meta_completed()))
            .map(|(id, r)| BriefView::new(id, r))
            .collect())
    }

    /// Full view of one record, optionally re-checking its sidecars first.
    pub async fn detail(
        &self,
        category: VideoCategory,
        id: usize,
        recheck: bool,
    ) -> Result<DetailedView, LibraryError> {
        let cat = self.category(category);
        cat.ensure_readable()?;
        let (generation, record) = cat.get(id)?;

        if !recheck {
            return Ok(DetailedView::new(id, &record));
        }

        let scanner = self.scanner.clone();
        let record = tokio::task::spawn_blocking(move || {
            let mut record = record;
            scanner.check_status(&mut record, false);
            record
        })
        .await
        .map_err(ScanError::Join)?;

        let view = DetailedView::new(id, &record);
        cat.store(id, generation, record);
        Ok(view)
    }

    /// Run the scrape pipeline for one record.
    ///
    /// A failing stage leaves the fields of earlier stages updated, in memory
    /// and on disk.
    pub async fn scrape(
        &self,
        category: VideoCategory,
        id: usize,
        tmdb_id: u64,
        season: Option<u32>,
        force_use_online_meta: Option<bool>,
    ) -> Result<DetailedView, LibraryError> {
        let cat = self.category(category);
        cat.ensure_readable()?;
        let (generation, record) = cat.get(id)?;
        let season = match (record.is_tv(), season) {
            (true, None) => return Err(LibraryError::MissingSeasonId),
            (_, season) => season,
        };
        let mut record = self.resolve_hdr(record).await?;

        let result = if let Some(season) = season.filter(|_| record.is_tv()) {
            let force = force_use_online_meta
                .unwrap_or(self.scraper.settings().force_use_online_tv_meta);
            self.scraper
                .scrape_tv(&mut record, tmdb_id, season, force)
                .await
        } else {
            self.scraper.scrape_movie(&mut record, tmdb_id).await
        };

        let view = DetailedView::new(id, &record);
        cat.store(id, generation, record);
        result?;
        Ok(view)
    }
}
