//! HDR and Dolby Vision classification of video files via ffprobe.
//!
//! ```no_run
//! use nfoforge_probe::HdrProber;
//! use std::path::Path;
//!
//! let prober = HdrProber::default();
//! let class = prober.probe_or_sdr(Path::new("/media/movie.mkv"));
//! println!("{}", class);
//! ```

pub mod error;
pub mod ffprobe;
pub mod tools;

pub use error::{Error, Result};
pub use ffprobe::{classify_json, HdrProber};
pub use tools::{check_tool, check_tools, ToolInfo};
