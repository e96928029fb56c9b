//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which lays out movie, TV and movie-set roots in a
//! temporary directory and builds a full [`Library`] and [`AppContext`] on top
//! of them. The TMDB client points at `provider_url`, usually a `wiremock`
//! server.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nfoforge::config::Config;
use nfoforge::library::Library;
use nfoforge::metadata::{Scraper, TmdbProvider};
use nfoforge::scanner::Scanner;
use nfoforge::server::AppContext;
use nfoforge_probe::HdrProber;
use tempfile::TempDir;

/// Smallest byte string the sidecar check accepts as a JPEG.
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

/// A URL nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub struct TestHarness {
    pub dir: TempDir,
    pub config: Config,
    pub library: Arc<Library>,
    pub ctx: AppContext,
}

impl TestHarness {
    /// Harness whose provider is unreachable.
    pub fn new() -> Self {
        Self::with_provider(UNREACHABLE)
    }

    pub fn with_provider(provider_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        for sub in ["movies", "tv", "sets"] {
            std::fs::create_dir_all(dir.path().join(sub)).expect("failed to create root");
        }

        let mut config = Config::default();
        config.library.movie = vec![dir.path().join("movies")];
        config.library.tv = vec![dir.path().join("tv")];
        config.library.movie_set = vec![dir.path().join("sets")];
        config.provider.api_key = "test-key".into();
        config.provider.language = "en-US".into();
        config.provider.base_url = provider_url.to_string();
        config.provider.image_base_url = format!("{provider_url}/img/");
        config.provider.timeout_secs = 5;
        config.tools.ffprobe_path = Some(PathBuf::from("/nonexistent/bin/ffprobe"));

        let library = build_library(&config);
        let ctx = AppContext::new(Arc::clone(&library), config.clone());

        Self {
            dir,
            config,
            library,
            ctx,
        }
    }

    pub fn movies(&self) -> PathBuf {
        self.dir.path().join("movies")
    }

    pub fn tv(&self) -> PathBuf {
        self.dir.path().join("tv")
    }

    pub fn sets(&self) -> PathBuf {
        self.dir.path().join("sets")
    }
}

pub fn build_library(config: &Config) -> Arc<Library> {
    let scanner = Scanner::new(HdrProber::new(config.tools.ffprobe_path.clone()));
    let provider = TmdbProvider::new(&config.provider).expect("failed to build provider");
    let scraper = Scraper::new(Arc::new(provider), config.scrape_settings());
    Arc::new(Library::new(&config.library, scanner, scraper))
}

/// Create `path` (and its parents) with the given contents.
pub fn touch(path: &Path, contents: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent");
    }
    std::fs::write(path, contents).expect("failed to write fixture");
    path.to_path_buf()
}

/// A well-formed movie NFO carrying a tmdb id.
pub fn movie_nfo(title: &str, tmdb_id: u64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<movie>
  <title>{title}</title>
  <uniqueid type="tmdb" default="true">{tmdb_id}</uniqueid>
</movie>
"#
    )
}

/// A well-formed show NFO for an ongoing show.
pub fn show_nfo(title: &str, tmdb_id: u64, season: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<tvshow>
  <title>{title}</title>
  <uniqueid type="tmdb" default="true">{tmdb_id}</uniqueid>
  <status>Continuing</status>
  <season>{season}</season>
</tvshow>
"#
    )
}

/// A movie with every sidecar in place.
pub fn complete_movie(root: &Path, name: &str) -> PathBuf {
    let video = touch(&root.join(format!("{name}.mkv")), b"video");
    touch(&root.join(format!("{name}.nfo")), movie_nfo(name, 1).as_bytes());
    touch(&root.join(format!("{name}-poster.jpg")), JPEG);
    video
}

/// A show directory with `episodes` files named `Show.S01Exx.mkv`.
pub fn show_dir(root: &Path, name: &str, episodes: usize) -> PathBuf {
    let dir = root.join(name);
    for i in 1..=episodes {
        touch(&dir.join(format!("{name}.S01E{i:02}.mkv")), b"episode");
    }
    dir
}
