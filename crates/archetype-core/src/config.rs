//! User configuration.
//!
//! Settings come from `archetype.toml` in the current directory, else
//! `~/.config/archetype/config.toml`, else built-in defaults. Command-line
//! flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level archetype configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Default instrument file or legacy directory.
    #[serde(default)]
    pub instrument: Option<PathBuf>,
    /// Monte Carlo trials; the instrument default when unset.
    #[serde(default)]
    pub trials: Option<u32>,
    /// Noise standard deviation in scale units; the instrument default when unset.
    #[serde(default)]
    pub noise: Option<f64>,
    /// Fixed seed for reproducible simulations.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Distance-to-energy temperature; the scale default when unset.
    #[serde(default)]
    pub energy_temperature: Option<f64>,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Response logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// Local response log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./archetype-results")
}
fn default_log_path() -> PathBuf {
    PathBuf::from("./archetype-results/responses.jsonl")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
        }
    }
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        Self {
            instrument: None,
            trials: None,
            noise: None,
            seed: None,
            energy_temperature: None,
            output_dir: default_output_dir(),
            log: LogConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to nothing. Substituted values are not expanded again.
pub fn resolve_env_vars(s: &str) -> String {
    expand_vars(s, |name| std::env::var(name).ok())
}

fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `archetype.toml` in the current directory
/// 2. `~/.config/archetype/config.toml`
///
/// Environment variable overrides: `ARCHETYPE_TRIALS`, `ARCHETYPE_SEED`.
pub fn load_config() -> Result<ArchetypeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ArchetypeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("archetype.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => ArchetypeConfig::default(),
    };

    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Parse a config document and expand `${VAR}` references in its paths.
pub fn parse_config(content: &str) -> Result<ArchetypeConfig> {
    let mut config: ArchetypeConfig = toml::from_str(content)?;
    config.instrument = config.instrument.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);
    config.log.path = resolve_path(&config.log.path);
    Ok(config)
}

/// Apply `ARCHETYPE_TRIALS` / `ARCHETYPE_SEED` from `lookup`.
fn apply_overrides(
    mut config: ArchetypeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ArchetypeConfig> {
    if let Some(trials) = lookup("ARCHETYPE_TRIALS") {
        config.trials = Some(
            trials
                .trim()
                .parse()
                .with_context(|| format!("invalid ARCHETYPE_TRIALS: {trials}"))?,
        );
    }
    if let Some(seed) = lookup("ARCHETYPE_SEED") {
        config.seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("invalid ARCHETYPE_SEED: {seed}"))?,
        );
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("archetype"))
}
