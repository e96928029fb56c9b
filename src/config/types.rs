use crate::metadata::providers::tmdb::{TMDB_BASE_URL, TMDB_IMAGE_BASE};
use crate::metadata::ScrapeSettings;
use nfoforge_common::VideoCategory;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            hdr_title_suffix: self.scrape.hdr_title_suffix,
            force_use_online_tv_meta: self.scrape.force_use_online_tv_meta,
            image_languages: self.provider.image_languages.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    54250
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Metadata provider (TMDB) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,

    /// Language tag sent with detail requests.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// TMDB image size segment, e.g. `original` or `w500`.
    #[serde(default = "default_image_quality")]
    pub image_quality: String,

    /// Image languages tried in order before unlabelled images.
    #[serde(default = "default_image_languages")]
    pub image_languages: Vec<String>,

    /// HTTP(S) proxy URL for provider requests.
    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "zh-CN".to_string()
}
fn default_base_url() -> String {
    TMDB_BASE_URL.to_string()
}
fn default_image_base_url() -> String {
    TMDB_IMAGE_BASE.to_string()
}
fn default_image_quality() -> String {
    "original".to_string()
}
fn default_image_languages() -> Vec<String> {
    vec!["zh".to_string(), "en".to_string()]
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            image_quality: default_image_quality(),
            image_languages: default_image_languages(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Library roots per category and background behavior.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub movie: Vec<PathBuf>,

    #[serde(default)]
    pub tv: Vec<PathBuf>,

    #[serde(default)]
    pub movie_set: Vec<PathBuf>,

    /// Scan every category once at startup.
    #[serde(default)]
    pub scan_on_start: bool,

    /// Seconds between automatic TV episode updates; 0 disables them.
    #[serde(default)]
    pub auto_update_interval_secs: u64,
}

impl LibraryConfig {
    pub fn roots(&self, category: VideoCategory) -> &[PathBuf] {
        match category {
            VideoCategory::Movie => &self.movie,
            VideoCategory::MovieSet => &self.movie_set,
            VideoCategory::TvShow => &self.tv,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_true")]
    pub hdr_title_suffix: bool,

    #[serde(default)]
    pub force_use_online_tv_meta: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            hdr_title_suffix: true,
            force_use_online_tv_meta: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
