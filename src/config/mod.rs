mod types;

pub use types::*;

use anyhow::{Context, Result};
use nfoforge_common::VideoCategory;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./nfoforge.toml",
        "~/.config/nfoforge/config.toml",
        "/etc/nfoforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    for category in VideoCategory::ALL {
        for path in config.library.roots(category) {
            if !path.exists() {
                tracing::warn!("{} library path does not exist: {:?}", category, path);
            }
        }
    }

    if config.provider.timeout_secs == 0 {
        anyhow::bail!("Provider timeout cannot be 0");
    }

    if config.provider.api_key.is_empty() && config.library.auto_update_interval_secs > 0 {
        tracing::warn!("Auto update is enabled but no provider API key is configured");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 54250);
        assert_eq!(config.provider.language, "zh-CN");
        assert_eq!(config.provider.image_languages, vec!["zh", "en"]);
        assert!(config.scrape.hdr_title_suffix);
        assert!(!config.scrape.force_use_online_tv_meta);
        assert_eq!(config.library.auto_update_interval_secs, 0);
    }

    #[test]
    fn test_library_roots_by_category() {
        let config: Config = toml::from_str(
            r#"
            [library]
            movie = ["/media/movies"]
            tv = ["/media/tv", "/media/anime"]
            movie_set = ["/media/sets"]
            "#,
        )
        .unwrap();

        assert_eq!(config.library.roots(VideoCategory::Movie).len(), 1);
        assert_eq!(config.library.roots(VideoCategory::TvShow).len(), 2);
        assert_eq!(
            config.library.roots(VideoCategory::MovieSet),
            &[std::path::PathBuf::from("/media/sets")]
        );
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
