//! FFprobe-based HDR classification.

use crate::{Error, Result};
use nfoforge_common::HdrClass;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

const DOVI_SIDE_DATA: &str = "DOVI configuration record";

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: String,
    color_transfer: Option<String>,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    side_data_type: Option<String>,
    dv_profile: Option<i64>,
    dv_bl_signal_compatibility_id: Option<i64>,
}

/// Runs ffprobe against video files and classifies their dynamic range.
#[derive(Debug, Clone)]
pub struct HdrProber {
    ffprobe: PathBuf,
}

impl Default for HdrProber {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HdrProber {
    /// Use `ffprobe` from `PATH` unless an explicit executable is configured.
    pub fn new(ffprobe: Option<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.unwrap_or_else(|| PathBuf::from("ffprobe")),
        }
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }

    /// Probe `path` and classify its first video stream.
    pub fn probe(&self, path: &Path) -> Result<HdrClass> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "Probing HDR format");

        let mut target = std::ffi::OsString::from("file:");
        target.push(path.as_os_str());

        let output = Command::new(&self.ffprobe)
            .args([
                "-analyzeduration",
                "200M",
                "-probesize",
                "1G",
                "-threads",
                "0",
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
                "-i",
            ])
            .arg(target)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(self.ffprobe.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed("ffprobe", stderr.trim()));
        }

        let json_str = String::from_utf8(output.stdout)
            .map_err(|e| Error::invalid_output("ffprobe", format!("Invalid UTF-8: {}", e)))?;

        classify_json(&json_str)
    }

    /// Like [`probe`](Self::probe), but any failure degrades to [`HdrClass::Sdr`].
    pub fn probe_or_sdr(&self, path: &Path) -> HdrClass {
        match self.probe(path) {
            Ok(class) => class,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "HDR probe failed, assuming SDR");
                HdrClass::Sdr
            }
        }
    }
}

/// Classify an ffprobe JSON report (`-show_streams`).
///
/// Returns [`HdrClass::Unknown`] when the report has no video stream.
pub fn classify_json(json: &str) -> Result<HdrClass> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    Ok(classify(&output))
}

fn classify(output: &FfprobeOutput) -> HdrClass {
    let Some(video) = output.streams.iter().find(|s| s.codec_type == "video") else {
        return HdrClass::Unknown;
    };

    let dovi = video
        .side_data_list
        .iter()
        .find(|sd| sd.side_data_type.as_deref() == Some(DOVI_SIDE_DATA));

    match dovi {
        Some(sd) => from_dolby_config(
            sd.dv_profile.unwrap_or(-1),
            sd.dv_bl_signal_compatibility_id.unwrap_or(-1),
        ),
        None => from_transfer(video.color_transfer.as_deref().unwrap_or_default()),
    }
}

/// Map a Dolby Vision profile and base-layer compatibility id to a class.
pub fn from_dolby_config(profile: i64, compatibility_id: i64) -> HdrClass {
    match (profile, compatibility_id) {
        (5, _) => HdrClass::DolbyVision,
        (7, _) => HdrClass::Hdr10,
        (8, 1 | 6) => HdrClass::DolbyVisionHdr10,
        (8, 2) => HdrClass::DolbyVisionSdr,
        (8, 4) => HdrClass::DolbyVisionHlg,
        _ => HdrClass::Sdr,
    }
}

/// Map a stream's transfer characteristic tag to a class.
pub fn from_transfer(color_transfer: &str) -> HdrClass {
    match color_transfer {
        "smpte2084" => HdrClass::Hdr10,
        "arib-std-b67" => HdrClass::Hlg,
        _ => HdrClass::Sdr,
    }
}
