use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::MAX_RANKING_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub rating: RatingConfig,

    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/rankarr.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 6791,
            cors_allowed_origins: vec![
                "http://localhost:6791".to_string(),
                "http://127.0.0.1:6791".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Inclusive upper bound of the admissible rating range (the scale is
    /// 0..=max_value). Range validation happens at the API edge.
    pub max_value: i32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self { max_value: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// A show needs strictly more than this many rated seasons to appear in
    /// public show rankings.
    pub min_count_shows: i32,

    /// Same, for seasons (rated episodes).
    pub min_count_seasons: i32,

    /// Same, for episodes (individual ratings). Pilots share this threshold.
    pub min_count_episodes: i32,

    /// How long a cached public ranking is served before recomputation.
    pub cache_ttl_secs: u64,

    /// Rows returned when the caller does not ask for a specific limit.
    pub default_limit: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_count_shows: 5,
            min_count_seasons: 3,
            min_count_episodes: 2,
            cache_ttl_secs: 24 * 60 * 60,
            default_limit: crate::constants::DEFAULT_RANKING_LIMIT,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.rating.max_value <= 0 {
            bail!("rating.max_value must be positive");
        }
        if self.ranking.min_count_shows < 0
            || self.ranking.min_count_seasons < 0
            || self.ranking.min_count_episodes < 0
        {
            bail!("ranking thresholds must not be negative");
        }
        if self.ranking.default_limit == 0 || self.ranking.default_limit > MAX_RANKING_LIMIT {
            bail!(
                "ranking.default_limit must be between 1 and {}",
                MAX_RANKING_LIMIT
            );
        }
        if self.general.max_db_connections < self.general.min_db_connections {
            bail!("general.max_db_connections must be >= min_db_connections");
        }
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("rankarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".rankarr").join("config.toml"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_rating_scale() {
        let mut config = Config::default();
        config.rating.max_value = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_default_limit() {
        let mut config = Config::default();
        config.ranking.default_limit = MAX_RANKING_LIMIT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [ranking]
            min_count_shows = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.ranking.min_count_shows, 9);
        assert_eq!(config.rating.max_value, 20);
    }
}
