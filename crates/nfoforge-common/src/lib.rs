//! Nfoforge-Common: shared types and on-disk naming conventions.
//!
//! - **Core Types**: video categories, sidecar statuses, file layouts and HDR classes
//! - **Path Utilities**: video extension detection and Kodi sidecar naming
//!
//! # Examples
//!
//! ```
//! use nfoforge_common::{VideoCategory, SidecarStatus};
//! use nfoforge_common::paths::is_video_file;
//! use std::path::Path;
//!
//! let category: VideoCategory = "movieSet".parse().unwrap();
//! assert_eq!(category, VideoCategory::MovieSet);
//! assert_eq!(SidecarStatus::default(), SidecarStatus::Missing);
//! assert!(is_video_file(Path::new("movie.mkv")));
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::ParseError;
pub use types::*;
