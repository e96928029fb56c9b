//! Artwork selection and download.

use super::provider::{ImageEntry, ImageSet, ImageTarget, MetadataProvider, ProviderError};
use crate::record::VideoRecord;
use crate::scanner::is_valid_image;
use nfoforge_common::SidecarStatus;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Image language that selects images without any language.
pub const NO_LANGUAGE: &str = "null";

/// Chosen image path fragments for the three artwork sidecars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artwork {
    pub poster: Option<String>,
    pub fanart: Option<String>,
    pub logo: Option<String>,
}

impl Artwork {
    pub fn is_complete(&self) -> bool {
        self.poster.is_some() && self.fanart.is_some() && self.logo.is_some()
    }

    /// Fill every empty slot with the first image of its kind.
    pub fn fill_from(&mut self, set: &ImageSet) {
        fn first(slot: &mut Option<String>, entries: &[ImageEntry]) {
            if slot.is_none() {
                *slot = entries
                    .iter()
                    .map(|e| e.file_path.clone())
                    .find(|p| !p.is_empty());
            }
        }

        first(&mut self.poster, &set.posters);
        first(&mut self.fanart, &set.backdrops);
        first(&mut self.logo, &set.logos);
    }
}

/// The configured image languages followed by the no-language filter.
pub fn language_chain(preferred: &[String]) -> Vec<&str> {
    preferred
        .iter()
        .map(String::as_str)
        .filter(|l| *l != NO_LANGUAGE)
        .chain(std::iter::once(NO_LANGUAGE))
        .collect()
}

/// Query each target in turn, walking the language chain for each, until
/// all three artwork slots are filled.
pub async fn collect_artwork(
    provider: &dyn MetadataProvider,
    targets: &[ImageTarget],
    languages: &[&str],
    artwork: &mut Artwork,
) -> Result<(), ProviderError> {
    for target in targets {
        for language in languages {
            if artwork.is_complete() {
                return Ok(());
            }
            let set = provider.images(*target, language).await?;
            artwork.fill_from(&set);
        }
    }
    Ok(())
}

/// Errors while fetching or storing one artwork file.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

async fn download_one(
    provider: &dyn MetadataProvider,
    image: Option<&str>,
    target: &Path,
) -> Result<SidecarStatus, DownloadError> {
    let Some(image) = image else {
        warn!(path = %target.display(), "No image available");
        return Ok(SidecarStatus::Missing);
    };

    let bytes = provider.download(image).await?;
    tokio::fs::write(target, &bytes)
        .await
        .map_err(|source| DownloadError::Io {
            path: target.to_path_buf(),
            source,
        })?;
    debug!(path = %target.display(), bytes = bytes.len(), "Saved image");

    Ok(if is_valid_image(&bytes) {
        SidecarStatus::Matched
    } else {
        SidecarStatus::Mismatched
    })
}

/// Download poster, fanart and logo to the record's sidecar paths and update
/// the matching statuses. Stops at the first failed download.
pub async fn download_artwork(
    provider: &dyn MetadataProvider,
    record: &mut VideoRecord,
    artwork: &Artwork,
) -> Result<(), DownloadError> {
    let sidecars = record.sidecars.clone();

    record.poster_status =
        download_one(provider, artwork.poster.as_deref(), &sidecars.poster).await?;
    record.fanart_status =
        download_one(provider, artwork.fanart.as_deref(), &sidecars.fanart).await?;
    record.clearlogo_status =
        download_one(provider, artwork.logo.as_deref(), &sidecars.clearlogo).await?;
    Ok(())
}
