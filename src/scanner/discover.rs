//! Depth-limited discovery of movies, movie sets and TV shows.

use super::episodes::sort_episodes;
use super::ScanError;
use crate::record::VideoRecord;
use nfoforge_common::paths::is_video_file;
use nfoforge_common::{FileLayout, VideoCategory};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Direct children of `dir`, sorted by name.
fn children(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    children(dir)
        .filter(|e| e.file_type().is_dir())
        .map(DirEntry::into_path)
        .collect()
}

fn direct_videos(dir: &Path) -> Vec<PathBuf> {
    children(dir)
        .filter(|e| e.file_type().is_file() && is_video_file(e.path()))
        .map(DirEntry::into_path)
        .collect()
}

/// The biggest video file directly inside `dir`; the first by name wins ties.
fn largest_video(dir: &Path) -> Option<PathBuf> {
    children(dir)
        .filter(|e| e.file_type().is_file() && is_video_file(e.path()))
        .filter_map(|e| e.metadata().ok().map(|m| (m.len(), e.into_path())))
        .fold(None, |best: Option<(u64, PathBuf)>, (size, path)| match best {
            Some((best_size, _)) if best_size >= size => best,
            _ => Some((size, path)),
        })
        .map(|(_, path)| path)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn ensure_running(cancel: &CancellationToken) -> Result<(), ScanError> {
    if cancel.is_cancelled() {
        Err(ScanError::Cancelled)
    } else {
        Ok(())
    }
}

fn push_set(set_dir: &Path, members: Vec<PathBuf>, out: &mut Vec<VideoRecord>) {
    if members.len() < 2 {
        warn!(
            path = %set_dir.display(),
            members = members.len(),
            "Ignoring movie set with fewer than two movies"
        );
        return;
    }

    let set_name = dir_name(set_dir);
    trace!(path = %set_dir.display(), members = members.len(), "Found movie set");
    for video in members {
        let mut record = VideoRecord::movie(VideoCategory::MovieSet, &video, FileLayout::InFolder);
        record.detail.set_name = Some(set_name.clone());
        out.push(record);
    }
}

/// Movies under one library root.
///
/// Video files directly in the root are standalone movies. A subdirectory
/// contributes its largest video file; a subdirectory without one is tried
/// as a movie set of per-folder movies.
pub fn movies(
    root: &Path,
    cancel: &CancellationToken,
    out: &mut Vec<VideoRecord>,
) -> Result<(), ScanError> {
    for entry in children(root) {
        ensure_running(cancel)?;
        let path = entry.path();

        if entry.file_type().is_file() {
            if is_video_file(path) {
                trace!(path = %path.display(), "Found movie");
                out.push(VideoRecord::movie(VideoCategory::Movie, path, FileLayout::Standalone));
            }
        } else if entry.file_type().is_dir() {
            if let Some(video) = largest_video(path) {
                trace!(path = %video.display(), "Found movie");
                out.push(VideoRecord::movie(VideoCategory::Movie, &video, FileLayout::InFolder));
            } else {
                let members: Vec<PathBuf> = subdirectories(path)
                    .iter()
                    .filter_map(|d| largest_video(d))
                    .collect();
                if !members.is_empty() {
                    push_set(path, members, out);
                }
            }
        }
    }
    Ok(())
}

/// Movie sets under a root where every subdirectory is one set.
///
/// Members are the video files directly in the set directory plus the
/// largest video of each of its subdirectories.
pub fn movie_sets(
    root: &Path,
    cancel: &CancellationToken,
    out: &mut Vec<VideoRecord>,
) -> Result<(), ScanError> {
    for set_dir in subdirectories(root) {
        ensure_running(cancel)?;

        let mut members = direct_videos(&set_dir);
        members.extend(subdirectories(&set_dir).iter().filter_map(|d| largest_video(d)));
        push_set(&set_dir, members, out);
    }
    Ok(())
}

/// TV shows under one library root, one per subdirectory.
///
/// A subdirectory without episodes of its own but with two or more episodic
/// subdirectories is a collection whose subdirectories are separate shows.
pub fn shows(
    root: &Path,
    cancel: &CancellationToken,
    out: &mut Vec<VideoRecord>,
) -> Result<(), ScanError> {
    for show_dir in subdirectories(root) {
        ensure_running(cancel)?;

        let mut episodes = direct_videos(&show_dir);
        if !episodes.is_empty() {
            sort_episodes(&mut episodes);
            trace!(path = %show_dir.display(), episodes = episodes.len(), "Found TV show");
            out.push(VideoRecord::show(&show_dir, episodes));
            continue;
        }

        let collection: Vec<(PathBuf, Vec<PathBuf>)> = subdirectories(&show_dir)
            .into_iter()
            .map(|d| {
                let eps = direct_videos(&d);
                (d, eps)
            })
            .filter(|(_, eps)| !eps.is_empty())
            .collect();

        match collection.len() {
            0 => out.push(VideoRecord::show(&show_dir, Vec::new())),
            1 => warn!(
                path = %show_dir.display(),
                "Ignoring TV collection with a single show"
            ),
            _ => {
                trace!(path = %show_dir.display(), shows = collection.len(), "Found TV collection");
                for (dir, mut eps) in collection {
                    sort_episodes(&mut eps);
                    out.push(VideoRecord::show(&dir, eps));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, size: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; size]).unwrap();
    }

    #[test]
    fn test_largest_video_ignores_non_video() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("sample.mkv"), 10);
        write(&dir.path().join("main.mkv"), 100);
        write(&dir.path().join("huge.iso.part"), 1000);

        assert_eq!(largest_video(dir.path()), Some(dir.path().join("main.mkv")));
    }

    #[test]
    fn test_movies_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("Loose.mkv"), 1);
        write(&root.join("Folder/Folder.mp4"), 1);
        write(&root.join("notes.txt"), 1);

        let mut out = Vec::new();
        movies(root, &CancellationToken::new(), &mut out).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].path, root.join("Folder/Folder.mp4"));
        assert_eq!(out[0].layout, FileLayout::InFolder);
        assert_eq!(out[1].path, root.join("Loose.mkv"));
        assert_eq!(out[1].layout, FileLayout::Standalone);
        assert!(out.iter().all(|r| r.category == VideoCategory::Movie));
    }

    #[test]
    fn test_movie_set_detection() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("Trilogy/Part 1/p1.mkv"), 1);
        write(&root.join("Trilogy/Part 2/p2.mkv"), 1);
        write(&root.join("Lonely/Only/only.mkv"), 1);

        let mut out = Vec::new();
        movies(root, &CancellationToken::new(), &mut out).unwrap();

        assert_eq!(out.len(), 2);
        for record in &out {
            assert_eq!(record.category, VideoCategory::MovieSet);
            assert_eq!(record.detail.set_name.as_deref(), Some("Trilogy"));
        }
    }

    #[test]
    fn test_tv_collection_detection() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("Show/Show.S01E02.mkv"), 1);
        write(&root.join("Show/Show.S01E01.mkv"), 1);
        write(&root.join("Saga/Season 1/a.S01E01.mkv"), 1);
        write(&root.join("Saga/Season 2/a.S02E01.mkv"), 1);
        write(&root.join("Half/Only/x.mkv"), 1);
        fs::create_dir_all(root.join("Empty")).unwrap();

        let mut out = Vec::new();
        shows(root, &CancellationToken::new(), &mut out).unwrap();

        let dirs: Vec<PathBuf> = out.iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                root.join("Empty"),
                root.join("Saga/Season 1"),
                root.join("Saga/Season 2"),
                root.join("Show"),
            ]
        );
        assert_eq!(
            out[3].detail.episode_paths,
            vec![root.join("Show/Show.S01E01.mkv"), root.join("Show/Show.S01E02.mkv")]
        );
        assert!(out[0].detail.episode_paths.is_empty());
    }

    #[test]
    fn test_cancelled_discovery_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("A.mkv"), 1);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        assert!(matches!(
            movies(dir.path(), &cancel, &mut out),
            Err(ScanError::Cancelled)
        ));
    }
}
