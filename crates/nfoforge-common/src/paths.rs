//! Path utilities for video detection and Kodi sidecar naming.
//!
//! Sidecar names are fixed by convention:
//!
//! - movies: `<basename>.nfo`, `<basename>-poster.jpg`, `<basename>-fanart.jpg`,
//!   `<basename>-clearlogo.jpg` next to the video file
//! - TV shows: `tvshow.nfo`, `poster.jpg`, `fanart.jpg`, `clearlogo.jpg` inside
//!   the show directory, plus `<episode-basename>.nfo` per episode

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// List of supported video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "iso", "ts", "m2ts", "avi", "m4v", "webm", "mov", "wmv",
];

/// Check if a path has a video file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use nfoforge_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/disc.ISO")));
/// assert!(!is_video_file(Path::new("movie.nfo")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[must_use]
pub fn video_extensions() -> &'static [&'static str] {
    VIDEO_EXTENSIONS
}

/// Expected locations of the metadata files belonging to one video record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarPaths {
    pub nfo: PathBuf,
    pub poster: PathBuf,
    pub fanart: PathBuf,
    pub clearlogo: PathBuf,
}

impl SidecarPaths {
    /// Sidecars of a movie file, named after its basename.
    ///
    /// ```
    /// use std::path::Path;
    /// use nfoforge_common::paths::SidecarPaths;
    ///
    /// let paths = SidecarPaths::for_movie(Path::new("/m/Heat (1995)/Heat.mkv"));
    /// assert_eq!(paths.nfo, Path::new("/m/Heat (1995)/Heat.nfo"));
    /// assert_eq!(paths.poster, Path::new("/m/Heat (1995)/Heat-poster.jpg"));
    /// ```
    pub fn for_movie(video: &Path) -> Self {
        let dir = video.parent().unwrap_or_else(|| Path::new(""));
        let base = basename(video);

        Self {
            nfo: dir.join(format!("{base}.nfo")),
            poster: dir.join(format!("{base}-poster.jpg")),
            fanart: dir.join(format!("{base}-fanart.jpg")),
            clearlogo: dir.join(format!("{base}-clearlogo.jpg")),
        }
    }

    /// Sidecars of a TV show directory.
    pub fn for_show(show_dir: &Path) -> Self {
        Self {
            nfo: show_dir.join("tvshow.nfo"),
            poster: show_dir.join("poster.jpg"),
            fanart: show_dir.join("fanart.jpg"),
            clearlogo: show_dir.join("clearlogo.jpg"),
        }
    }
}

/// NFO path of a single episode file.
///
/// ```
/// use std::path::Path;
/// use nfoforge_common::paths::episode_nfo_path;
///
/// let nfo = episode_nfo_path(Path::new("/tv/Show/Show.S01E02.mkv"));
/// assert_eq!(nfo, Path::new("/tv/Show/Show.S01E02.nfo"));
/// ```
pub fn episode_nfo_path(episode: &Path) -> PathBuf {
    episode.with_extension("nfo")
}

/// File name without its last extension.
fn basename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
