//! Runtime configuration.
//!
//! Every field has a default, so a missing or partial `config.json` is fine.
//! Precedence: explicit overrides > environment > file > defaults.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::model::Profile;
use crate::tracking::{ProgressOptions, ReroutePolicy};

pub const DEFAULT_BASE_URL: &str = "https://gh.heatwaves.app";
pub const ENV_BASE_URL: &str = "HEATWALK_GH_BASE_URL";
pub const ENV_API_KEY: &str = "HEATWALK_GH_API_KEY";

/// Routing-service weighting override, passed through as raw JSON.
pub type CustomModel = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub cache_ttl_s: u64,
    pub locale: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_ms: 12_000,
            cache_ttl_s: 30,
            locale: "en".to_string(),
        }
    }
}

/// Default custom model sent with each profile when the caller gives none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileModels {
    pub fast: Option<CustomModel>,
    pub balanced: Option<CustomModel>,
    pub cool: Option<CustomModel>,
}

impl Default for ProfileModels {
    fn default() -> Self {
        let placeholder = serde_json::json!({ "priority": [], "speed": [] });
        Self {
            fast: None,
            balanced: Some(placeholder.clone()),
            cool: Some(placeholder),
        }
    }
}

impl ProfileModels {
    pub fn for_profile(&self, profile: Profile) -> Option<&CustomModel> {
        match profile {
            Profile::Fast => self.fast.as_ref(),
            Profile::Balanced => self.balanced.as_ref(),
            Profile::Cool => self.cool.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub routing: RoutingConfig,
    pub reroute: ReroutePolicy,
    pub progress: ProgressOptions,
    pub models: ProfileModels,
}

impl NavConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default().with_env()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default().with_env());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config: {}", path.display()))?;
        let cfg: NavConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config JSON: {}", path.display()))?;

        Ok(cfg.with_env())
    }

    /// Apply `HEATWALK_GH_BASE_URL` / `HEATWALK_GH_API_KEY` when set.
    pub fn with_env(mut self) -> Self {
        if let Some(base) = std::env::var(ENV_BASE_URL).ok().filter(|s| !s.trim().is_empty()) {
            self.routing.base_url = base;
        }
        if let Some(key) = std::env::var(ENV_API_KEY).ok().filter(|s| !s.trim().is_empty()) {
            self.routing.api_key = Some(key);
        }
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("app", "heatwaves", "heatwalk").map(|p| p.config_dir().join("config.json"))
}

static PORT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:\d+$").expect("port pattern"));
static LOCAL_HOST_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(localhost|\d{1,3}(\.\d{1,3}){3}):\d+$").expect("host:port pattern")
});
static HAS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern"));
static GRAPHHOPPER_CLOUD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)graphhopper\.com/api/1$").expect("cloud pattern"));

/// Normalize user-supplied service addresses.
///
/// `:8989` → `http://localhost:8989`, `host:port` → `http://host:port`,
/// a bare host gets `http://`; trailing slashes are dropped first.
pub fn normalize_base_url(input: &str) -> Option<String> {
    let s = input.trim().trim_end_matches('/');
    if s.is_empty() {
        return None;
    }

    let url = if PORT_ONLY.is_match(s) {
        format!("http://localhost{s}")
    } else if LOCAL_HOST_PORT.is_match(s) {
        format!("http://{s}")
    } else if HAS_SCHEME.is_match(s) {
        s.to_string()
    } else {
        format!("http://{s}")
    };
    Some(url)
}

/// GraphHopper's hosted API, which needs an API key.
pub fn is_graphhopper_cloud(base: &str) -> bool {
    GRAPHHOPPER_CLOUD.is_match(base.trim_end_matches('/'))
}
