//! Kodi NFO codec.
//!
//! Reads NFO sidecars into [`VideoRecord`](crate::record::VideoRecord)s,
//! writes records and episode listings back as NFO XML, and renders the JSON
//! views served by the HTTP API.

mod read;
mod tree;
mod view;
mod write;

pub use read::{apply_nfo, parse_nfo_into_record, read_nfo};
pub use tree::XmlElement;
pub use view::{BriefView, DetailView, DetailedView};
pub use write::{
    generated_episode_title, render_record, write_episode_nfos, write_record_as_nfo, EpisodeMeta,
};

use std::path::PathBuf;

/// Root elements a sidecar NFO may carry.
pub const ACCEPTED_ROOTS: &[&str] = &["movie", "tvshow", "episodedetails"];

/// Errors raised while reading or writing NFO files.
#[derive(Debug, thiserror::Error)]
pub enum NfoError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML writer error: {0}")]
    Write(#[from] std::io::Error),

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("document has no root element")]
    Empty,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("second root element <{0}>")]
    ExtraRoot(String),
}

impl NfoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
