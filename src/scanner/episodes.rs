//! Episode ordering.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)S(\d{1,3})E(\d{1,4})").expect("episode pattern is a valid regex")
});

/// Season and episode number from a name like `Show.S01E05.1080p.mkv`.
pub fn parse_episode_number(path: &Path) -> Option<(u32, u32)> {
    let name = path.file_name()?.to_string_lossy();
    let caps = EPISODE_PATTERN.captures(&name)?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    Some((season, episode))
}

/// Order episodes by parsed season/episode number.
///
/// If any file name lacks the `SxxEyy` marker the whole list is sorted
/// lexicographically instead.
pub fn sort_episodes(episodes: &mut [PathBuf]) {
    let all_numbered = episodes.iter().all(|p| parse_episode_number(p).is_some());

    if all_numbered {
        episodes.sort_by(|a, b| {
            parse_episode_number(a)
                .cmp(&parse_episode_number(b))
                .then_with(|| a.cmp(b))
        });
    } else {
        episodes.sort();
    }
}
