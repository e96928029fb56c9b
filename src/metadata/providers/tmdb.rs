//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] against the TMDB v3 REST API. Every detail
//! request carries the configured API key and language; image listings are
//! filtered by `include_image_language` instead.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::metadata::provider::{
    Credits, ImageSet, ImageTarget, MetadataProvider, MovieDetail, ProviderError, SeasonDetail,
    TvDetail,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/";
const USER_AGENT: &str = concat!("nfoforge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use nfoforge::config::ProviderConfig;
/// use nfoforge::metadata::providers::TmdbProvider;
///
/// let config = ProviderConfig {
///     api_key: "your-api-key".into(),
///     ..Default::default()
/// };
/// let provider = TmdbProvider::new(&config).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    image_base_url: String,
    image_quality: String,
}

impl TmdbProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
            debug!(proxy, "Routing TMDB requests through proxy");
            builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(ProviderError::Client)?);
        }

        let client = builder.build().map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            image_quality: config.image_quality.trim_matches('/').to_string(),
        })
    }

    /// Execute a GET request and reject non-success statuses.
    async fn get(&self, path: &str, url: &str) -> Result<reqwest::Response, ProviderError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "TMDB request returned error");
            return Err(ProviderError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = self.url(path, extra_params);
        debug!(path, "TMDB request");

        self.get(path, &url)
            .await?
            .json()
            .await
            .map_err(|source| ProviderError::Decode {
                path: path.to_string(),
                source,
            })
    }

    /// Build a full API URL with the API key and language query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{path}?api_key={}&language={}",
            self.base_url,
            urlencoded(&self.api_key),
            urlencoded(&self.language)
        );
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    fn images_url(&self, path: &str, image_language: &str) -> String {
        format!(
            "{}{path}?api_key={}&include_image_language={}",
            self.base_url,
            urlencoded(&self.api_key),
            urlencoded(image_language)
        )
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b',' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

fn images_path(target: ImageTarget) -> String {
    match target {
        ImageTarget::Movie(id) => format!("/movie/{id}/images"),
        ImageTarget::Tv(id) => format!("/tv/{id}/images"),
        ImageTarget::Season { tv_id, season } => format!("/tv/{tv_id}/season/{season}/images"),
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn image_url(&self, path: &str) -> String {
        format!("{}/{}{}", self.image_base_url, self.image_quality, path)
    }

    async fn movie_detail(&self, id: u64) -> Result<MovieDetail, ProviderError> {
        self.get_json(&format!("/movie/{id}"), &[]).await
    }

    async fn movie_credits(&self, id: u64) -> Result<Credits, ProviderError> {
        self.get_json(&format!("/movie/{id}/credits"), &[]).await
    }

    async fn tv_detail(&self, id: u64) -> Result<TvDetail, ProviderError> {
        self.get_json(&format!("/tv/{id}"), &[("append_to_response", "external_ids")])
            .await
    }

    async fn tv_credits(&self, id: u64) -> Result<Credits, ProviderError> {
        self.get_json(&format!("/tv/{id}/credits"), &[]).await
    }

    async fn season_detail(&self, tv_id: u64, season: u32) -> Result<SeasonDetail, ProviderError> {
        self.get_json(&format!("/tv/{tv_id}/season/{season}"), &[])
            .await
    }

    async fn images(
        &self,
        target: ImageTarget,
        image_language: &str,
    ) -> Result<ImageSet, ProviderError> {
        let path = images_path(target);
        let url = self.images_url(&path, image_language);
        debug!(path = %path, image_language, "TMDB image listing");

        self.get(&path, &url)
            .await?
            .json()
            .await
            .map_err(|source| ProviderError::Decode { path, source })
    }

    async fn download(&self, path: &str) -> Result<Bytes, ProviderError> {
        let url = self.image_url(path);
        debug!(url = %url, "Downloading image");

        self.get(path, &url)
            .await?
            .bytes()
            .await
            .map_err(|source| ProviderError::Transport {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: &str) -> TmdbProvider {
        TmdbProvider::new(&ProviderConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn image_url_construction() {
        assert_eq!(
            provider("k").image_url("/abc123.jpg"),
            "https://image.tmdb.org/t/p/original/abc123.jpg"
        );
    }

    #[test]
    fn url_carries_key_and_language() {
        let url = provider("key").url("/tv/1", &[("append_to_response", "external_ids")]);
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/tv/1?api_key=key&language=zh-CN&append_to_response=external_ids"
        );
    }

    #[test]
    fn images_url_filters_language_only() {
        let url = provider("key").images_url("/movie/603/images", "null");
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/movie/603/images?api_key=key&include_image_language=null"
        );
    }

    #[test]
    fn image_paths() {
        assert_eq!(images_path(ImageTarget::Movie(603)), "/movie/603/images");
        assert_eq!(
            images_path(ImageTarget::Season { tv_id: 1399, season: 2 }),
            "/tv/1399/season/2/images"
        );
    }

    #[test]
    fn url_encoding() {
        assert_eq!(urlencoded("hello world"), "hello+world");
        assert_eq!(urlencoded("foo&bar"), "foo%26bar");
        assert_eq!(urlencoded("zh-CN"), "zh-CN");
    }

    #[test]
    fn provider_is_available() {
        assert!(provider("test-key").is_available());
        assert!(!provider("").is_available());
        assert_eq!(provider("k").name(), "tmdb");
    }
}
