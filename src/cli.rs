use clap::{Parser, Subcommand};
use nfoforge_common::VideoCategory;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nfoforge")]
#[command(author, version, about = "Kodi NFO scanner and scraper server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP control server and background services
    Start {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scan one library category and print a completeness report
    Scan {
        /// Category to scan: movie, tv or movieSet
        #[arg(required = true)]
        video_type: VideoCategory,

        /// Probe the HDR class even when the NFO already matches
        #[arg(long)]
        force_detect_hdr: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a video file and print its HDR class
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["nfoforge", "-v", "scan", "movieSet", "--json"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan {
                video_type, json, ..
            } => {
                assert_eq!(video_type, VideoCategory::MovieSet);
                assert!(json);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["nfoforge", "scan", "films"]).is_err());
    }
}
