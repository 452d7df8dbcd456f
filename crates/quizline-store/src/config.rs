//! Configuration and backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizline_core::engine::{EngineConfig, DEFAULT_PASSING_SCORE, DEFAULT_TIME_LIMIT_SECS};
use quizline_core::model::{Identity, Tier};
use quizline_core::traits::{ContentStore, ResultSink};

use crate::directory::{DirectoryStore, JsonResultSink};
use crate::http::HttpStore;

/// Where tests come from and where results go.
///
/// `Debug` prints `***` in place of the API key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// TOML question banks on disk, JSON results under `results_dir`.
    Directory {
        #[serde(default = "default_bank_dir")]
        path: PathBuf,
    },
    /// Remote REST store for both content and results.
    Http {
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Directory { path } => {
                f.debug_struct("Directory").field("path", path).finish()
            }
            StoreConfig::Http { base_url, api_key } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Directory {
            path: default_bank_dir(),
        }
    }
}

fn default_bank_dir() -> PathBuf {
    PathBuf::from("./banks")
}

/// The user taking tests from this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Tier,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
            name: None,
            tier: Tier::Free,
        }
    }
}

fn default_user_id() -> String {
    std::env::var("USER").unwrap_or_else(|_| "local".to_string())
}

/// Top-level quizline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizlineConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Directory for JSON results when using the directory store.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Time limit for tests that do not declare one.
    #[serde(default = "default_time_limit")]
    pub default_time_limit_secs: u64,
    /// Passing percentage for tests that do not declare one.
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    /// Length of one countdown second in milliseconds.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    #[serde(default)]
    pub user: UserConfig,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("./quizline-results")
}
fn default_time_limit() -> u64 {
    DEFAULT_TIME_LIMIT_SECS
}
fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}
fn default_tick_millis() -> u64 {
    1000
}

impl Default for QuizlineConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            results_dir: default_results_dir(),
            default_time_limit_secs: default_time_limit(),
            passing_score: default_passing_score(),
            tick_millis: default_tick_millis(),
            user: UserConfig::default(),
        }
    }
}

impl QuizlineConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_time_limit_secs: self.default_time_limit_secs,
            passing_score: self.passing_score,
            tick_period: Duration::from_millis(self.tick_millis.max(1)),
        }
    }

    pub fn identity(&self) -> Identity {
        let mut identity = Identity::new(self.user.id.clone(), self.user.tier);
        if let Some(name) = &self.user.name {
            identity.display_name = name.clone();
        }
        identity
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Directory { path } => StoreConfig::Directory {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        StoreConfig::Http { base_url, api_key } => StoreConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_key: api_key.as_ref().map(|k| resolve_env_vars(k)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizline.toml` in the current directory
/// 2. `~/.config/quizline/config.toml`
///
/// Environment variable overrides: `QUIZLINE_API_KEY`, `QUIZLINE_USER`.
pub fn load_config() -> Result<QuizlineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizlineConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizline.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizlineConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML config string and resolve `${VAR}` references in it.
pub fn parse_config(content: &str) -> Result<QuizlineConfig> {
    let mut config: QuizlineConfig = toml::from_str(content)?;
    config.store = resolve_store_config(&config.store);
    config.results_dir = PathBuf::from(resolve_env_vars(&config.results_dir.to_string_lossy()));
    config.user.id = resolve_env_vars(&config.user.id);
    if config.user.id.trim().is_empty() {
        config.user.id = "local".to_string();
    }
    Ok(config)
}

fn apply_env_overrides(config: &mut QuizlineConfig) {
    if let Ok(key) = std::env::var("QUIZLINE_API_KEY") {
        if let StoreConfig::Http { api_key, .. } = &mut config.store {
            *api_key = Some(key);
        }
    }
    if let Ok(user) = std::env::var("QUIZLINE_USER") {
        if !user.is_empty() {
            config.user.id = user;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizline"))
}

/// The content store and result sink a config describes.
pub struct Backends {
    pub store: Arc<dyn ContentStore>,
    pub sink: Arc<dyn ResultSink>,
}

/// Create the content store and result sink from configuration.
pub fn create_backends(config: &QuizlineConfig) -> Result<Backends> {
    match &config.store {
        StoreConfig::Directory { path } => {
            let store = DirectoryStore::open(path)
                .with_context(|| format!("failed to open question banks at {}", path.display()))?;
            Ok(Backends {
                store: Arc::new(store),
                sink: Arc::new(JsonResultSink::new(&config.results_dir)),
            })
        }
        StoreConfig::Http { base_url, api_key } => {
            let http = Arc::new(HttpStore::new(base_url, api_key.clone())?);
            Ok(Backends {
                store: Arc::clone(&http) as Arc<dyn ContentStore>,
                sink: http,
            })
        }
    }
}
