//! External tool detection.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the tool's version banner.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Check whether `executable` runs with `-version`, as ffmpeg tools expect.
pub fn check_tool(executable: &Path) -> ToolInfo {
    let name = executable
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| executable.display().to_string());

    match Command::new(executable).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = if executable.components().count() > 1 {
                Some(executable.to_path_buf())
            } else {
                which::which(executable).ok()
            };

            ToolInfo {
                name,
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check every tool the scanner shells out to.
pub fn check_tools(ffprobe: Option<&Path>) -> Vec<ToolInfo> {
    vec![check_tool(ffprobe.unwrap_or_else(|| Path::new("ffprobe")))]
}
