//! Sidecar file validation.
//!
//! Images are checked by their leading and trailing bytes, and only those
//! bytes are read from disk: a JPEG must start with `FF D8` and end with
//! `FF D9`, a PNG must carry the 8-byte PNG signature and end with the IEND
//! chunk. Anything else, including a file cut short mid-download, is
//! `Mismatched`.

use crate::nfo::{read_nfo, XmlElement};
use nfoforge_common::SidecarStatus;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

const JPEG_HEADER: [u8; 2] = [0xFF, 0xD8];
const JPEG_TRAILER: [u8; 2] = [0xFF, 0xD9];
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_TRAILER: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];

/// Bytes kept from each end of a file; the longest signature.
const EDGE_LEN: usize = 8;

pub fn is_valid_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= JPEG_HEADER.len() + JPEG_TRAILER.len()
        && bytes.starts_with(&JPEG_HEADER)
        && bytes.ends_with(&JPEG_TRAILER)
}

pub fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_SIGNATURE.len() + PNG_TRAILER.len()
        && bytes.starts_with(&PNG_SIGNATURE)
        && bytes.ends_with(&PNG_TRAILER)
}

/// Validate as PNG when the PNG signature is present, otherwise as JPEG.
pub fn is_valid_image(bytes: &[u8]) -> bool {
    if bytes.starts_with(&PNG_SIGNATURE) {
        is_valid_png(bytes)
    } else {
        is_valid_jpeg(bytes)
    }
}

pub fn check_image(path: &Path) -> SidecarStatus {
    if !path.exists() {
        return SidecarStatus::Missing;
    }

    match read_edges(path) {
        Ok(bytes) if is_valid_image(&bytes) => SidecarStatus::Matched,
        Ok(_) => {
            debug!(path = %path.display(), "Image signature mismatch");
            SidecarStatus::Mismatched
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read image");
            SidecarStatus::Mismatched
        }
    }
}

/// The first and last [`EDGE_LEN`] bytes of a file, joined.
///
/// Files no longer than both edges together are read whole.
fn read_edges(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    if len <= (2 * EDGE_LEN) as u64 {
        let mut bytes = Vec::with_capacity(len as usize);
        file.read_to_end(&mut bytes)?;
        return Ok(bytes);
    }

    let mut bytes = vec![0; 2 * EDGE_LEN];
    file.read_exact(&mut bytes[..EDGE_LEN])?;
    file.seek(SeekFrom::End(-(EDGE_LEN as i64)))?;
    file.read_exact(&mut bytes[EDGE_LEN..])?;
    Ok(bytes)
}

/// Status of an NFO file, with its parsed root when it matched.
pub fn check_nfo(path: &Path) -> (SidecarStatus, Option<XmlElement>) {
    if !path.exists() {
        return (SidecarStatus::Missing, None);
    }

    match read_nfo(path) {
        Ok(root) => (SidecarStatus::Matched, Some(root)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "NFO mismatch");
            (SidecarStatus::Mismatched, None)
        }
    }
}
