//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nesting, e.g. `APP_RETRIEVAL__SEARCH_TOP_N`). Provides
//! typed retrieval settings and helpers to expand `~` and `${VAR}`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load `config.toml` and friends from the working directory.
    pub fn load() -> anyhow::Result<Self> { Self::load_in(Path::new(".")) }

    /// Load `config.toml`, `config.<env>.toml` and `APP_*` variables, with
    /// the files looked up in `base`. Missing files are skipped.
    pub fn load_in(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(base.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed retrieval settings from the `retrieval` table, defaults filled in.
    pub fn retrieval(&self) -> crate::error::Result<RetrievalSettings> {
        let settings: RetrievalSettings = self
            .figment
            .focus("retrieval")
            .extract()
            .map_err(|e| Error::InvalidConfig(format!("retrieval: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Knobs for loading records and answering queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// A record file, or a directory of record files.
    pub records_path: String,
    /// Where to persist the built index between runs; disabled when unset.
    pub snapshot_path: Option<String>,
    pub default_top_n: usize,
    pub search_top_n: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            records_path: "data/transcript.json".to_string(),
            snapshot_path: None,
            default_top_n: 1,
            search_top_n: 3,
        }
    }
}

impl RetrievalSettings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.default_top_n == 0 {
            return Err(Error::InvalidConfig("retrieval.default_top_n must be at least 1".to_string()));
        }
        if self.search_top_n == 0 {
            return Err(Error::InvalidConfig("retrieval.search_top_n must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn records_path(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.records_path) }

    pub fn snapshot_path(&self, base: &Path) -> Option<PathBuf> {
        self.snapshot_path.as_ref().map(|p| resolve_with_base(base, p))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
