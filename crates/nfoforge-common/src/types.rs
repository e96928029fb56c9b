//! Core type definitions shared by the scanner, the NFO codec and the HTTP API.
//!
//! Category names use the wire forms clients send as `videoType`
//! (`movie`, `tv`, `movieSet`).

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Library category a video record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoCategory {
    /// Standalone movies, one file or one folder per movie.
    #[serde(rename = "movie")]
    Movie,
    /// Movies discovered inside a movie-set directory.
    #[serde(rename = "movieSet")]
    MovieSet,
    /// TV shows, one directory per show season.
    #[serde(rename = "tv")]
    TvShow,
}

impl VideoCategory {
    /// Every category, in the order status listings report them.
    pub const ALL: [VideoCategory; 3] = [Self::Movie, Self::TvShow, Self::MovieSet];

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::MovieSet => "movieSet",
            Self::TvShow => "tv",
        }
    }

    /// Root element of the NFO written for this category.
    pub fn nfo_root(&self) -> &'static str {
        match self {
            Self::Movie | Self::MovieSet => "movie",
            Self::TvShow => "tvshow",
        }
    }
}

impl fmt::Display for VideoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoCategory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::TvShow),
            "movieSet" => Ok(Self::MovieSet),
            other => Err(ParseError::VideoCategory(other.to_string())),
        }
    }
}

/// Status of a sidecar file (NFO or image) next to a video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SidecarStatus {
    /// Present and well-formed.
    Matched,
    /// Present but failed validation.
    Mismatched,
    /// Not on disk.
    #[default]
    Missing,
}

impl SidecarStatus {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

impl fmt::Display for SidecarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => write!(f, "Matched"),
            Self::Mismatched => write!(f, "Mismatched"),
            Self::Missing => write!(f, "Missing"),
        }
    }
}

/// Whether a movie file sits directly in a library root or in its own folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileLayout {
    #[default]
    Standalone,
    InFolder,
}

/// Dynamic range classification of a video stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HdrClass {
    /// Not probed yet.
    #[default]
    Unknown,
    Sdr,
    Hdr10,
    Hlg,
    DolbyVision,
    DolbyVisionHdr10,
    DolbyVisionHlg,
    DolbyVisionSdr,
    Hdr10Plus,
}

impl HdrClass {
    /// Human readable label, also used as the NFO title suffix.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Sdr => "SDR",
            Self::Hdr10 => "HDR10",
            Self::Hlg => "HLG",
            Self::DolbyVision => "Dolby Vision",
            Self::DolbyVisionHdr10 => "DV HDR10",
            Self::DolbyVisionHlg => "DV HLG",
            Self::DolbyVisionSdr => "DV SDR",
            Self::Hdr10Plus => "HDR10+",
        }
    }

    /// True for every class except `Sdr` and `Unknown`.
    pub fn is_hdr(&self) -> bool {
        !matches!(self, Self::Sdr | Self::Unknown)
    }
}

impl fmt::Display for HdrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completeness filter accepted by record listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Incomplete,
    Complete,
}

impl StatusFilter {
    /// Whether a record with the given completeness passes the filter.
    pub fn accepts(&self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Incomplete => !completed,
            Self::Complete => completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "incomplete" => Ok(Self::Incomplete),
            "complete" => Ok(Self::Complete),
            other => Err(ParseError::StatusFilter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_category_round_trip() {
        for category in VideoCategory::ALL {
            let parsed: VideoCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert_eq!(
            "movies".parse::<VideoCategory>(),
            Err(ParseError::VideoCategory("movies".to_string()))
        );
    }

    #[test]
    fn test_video_category_serialization() {
        let json = serde_json::to_string(&VideoCategory::MovieSet).unwrap();
        assert_eq!(json, r#""movieSet""#);

        let category: VideoCategory = serde_json::from_str(r#""tv""#).unwrap();
        assert_eq!(category, VideoCategory::TvShow);
    }

    #[test]
    fn test_nfo_root_by_category() {
        assert_eq!(VideoCategory::Movie.nfo_root(), "movie");
        assert_eq!(VideoCategory::MovieSet.nfo_root(), "movie");
        assert_eq!(VideoCategory::TvShow.nfo_root(), "tvshow");
    }

    #[test]
    fn test_hdr_class_is_hdr() {
        assert!(!HdrClass::Unknown.is_hdr());
        assert!(!HdrClass::Sdr.is_hdr());
        assert!(HdrClass::Hlg.is_hdr());
        assert!(HdrClass::DolbyVisionSdr.is_hdr());
        assert_eq!(HdrClass::DolbyVisionHdr10.to_string(), "DV HDR10");
    }

    #[test]
    fn test_status_filter() {
        let filter: StatusFilter = "incomplete".parse().unwrap();
        assert!(filter.accepts(false));
        assert!(!filter.accepts(true));
        assert!(StatusFilter::All.accepts(true));
        assert!("done".parse::<StatusFilter>().is_err());
    }
}
