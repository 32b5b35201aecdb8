use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hard page size limit in bytes.
pub const DEFAULT_HARD_LIMIT: usize = 14_336;
/// Size above which a split is offered.
pub const DEFAULT_SOFT_THRESHOLD: usize = 14_336;
pub const DEFAULT_PAGE_OVERHEAD: usize = 2048;
pub const DEFAULT_PAGINATION_NAV_BYTES: usize = 160;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub hard_limit: usize,
    pub soft_threshold: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            hard_limit: DEFAULT_HARD_LIMIT,
            soft_threshold: DEFAULT_SOFT_THRESHOLD,
        }
    }
}

/// Tuning for the offline size estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub page_overhead: usize,
    pub pagination_nav_bytes: usize,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            page_overhead: DEFAULT_PAGE_OVERHEAD,
            pagination_nav_bytes: DEFAULT_PAGINATION_NAV_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub pages_path: PathBuf,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub estimate: EstimateConfig,
}

impl Config {
    pub fn new(pages_path: impl Into<PathBuf>) -> Self {
        Self {
            pages_path: pages_path.into(),
            limits: LimitsConfig::default(),
            estimate: EstimateConfig::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the pages path
        config.pages_path = Self::expand_path(&config.pages_path).unwrap_or(config.pages_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/tinypage");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        shellexpand::full(&path_str)
            .ok()
            .map(|expanded| PathBuf::from(expanded.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/tinypage/config.toml"));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str(r#"pages_path = "/srv/pages""#).unwrap();

        assert_eq!(config, Config::new("/srv/pages"));
        assert_eq!(config.limits.hard_limit, 14_336);
        assert_eq!(config.estimate.pagination_nav_bytes, 160);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config_content = r#"
pages_path = "/srv/pages"

[limits]
soft_threshold = 12000
"#;
        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.limits.soft_threshold, 12_000);
        assert_eq!(config.limits.hard_limit, DEFAULT_HARD_LIMIT);
        assert_eq!(config.estimate, EstimateConfig::default());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("TINYPAGE_TEST_VAR", "/test/env/path");
        }

        let expanded = Config::expand_path(&PathBuf::from("$TINYPAGE_TEST_VAR/subdir"));
        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("TINYPAGE_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_undefined_var_fails() {
        let expanded = Config::expand_path(&PathBuf::from("$TINYPAGE_SURELY_UNSET_VAR/x"));
        assert_eq!(expanded, None);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "pages_path = ").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut test_config = Config::new("/tmp/test-pages");
        test_config.limits.soft_threshold = 10_000;

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
