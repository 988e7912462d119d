//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MTR_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use crate::db::models::{PhasePolicy, SkipPolicy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "MTR_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "mtr.db";

/// Genres offered out of the box
pub const DEFAULT_GENRES: [&str; 10] = [
    "thrash",
    "death",
    "black",
    "power",
    "doom",
    "progressive",
    "heavy",
    "speed",
    "groove",
    "folk",
];

/// Contents of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub explorer: ExplorerSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5760,
        }
    }
}

/// Tuning knobs of the comparison and recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    pub max_recommendations: usize,
    pub default_suggestions: usize,
    /// Random draws per tier phase before the phase gives up
    pub retry_budget: usize,
    pub phase_policy: PhasePolicy,
    /// Explicit phase list such as `["well-known/well-known", "popular/niche"]`;
    /// overrides `phase_policy` when set
    pub pair_phases: Option<Vec<String>>,
    pub skip_policy: SkipPolicy,
    /// A genre is offered once it holds at least this many bands
    pub min_bands_per_genre: u64,
    pub genres: Vec<String>,
    /// Fixed seed for reproducible pair draws
    pub rng_seed: Option<u64>,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            max_recommendations: 10,
            default_suggestions: 3,
            retry_budget: 100,
            phase_policy: PhasePolicy::default(),
            pair_phases: None,
            skip_policy: SkipPolicy::default(),
            min_bands_per_genre: 5,
            genres: DEFAULT_GENRES.iter().map(|g| g.to_string()).collect(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// JSON file of bands keyed by genre used to populate the catalog
    pub seed_file: Option<PathBuf>,
    /// Populate every configured genre at startup
    pub seed_on_startup: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            seed_file: None,
            seed_on_startup: true,
        }
    }
}

/// Load the TOML configuration, falling back to defaults when the file is missing
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Locate the platform configuration file, if one exists
///
/// Linux tries `~/.config/mtr/config.toml`, then `/etc/mtr/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mtr").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mtr/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the root folder holding the database
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/mtr (or /var/lib/mtr for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("mtr"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/mtr"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("mtr"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\mtr"))
    } else {
        dirs::data_dir()
            .map(|d| d.join("mtr"))
            .unwrap_or_else(|| PathBuf::from("./mtr_data"))
    }
}

/// Path of the SQLite database inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}
