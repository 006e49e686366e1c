use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, XrefError};
use crate::graph::fuzzy::{DEFAULT_RESULT_CAP, DEFAULT_THRESHOLD};

/// Name of the configuration file stored inside the `.partsxref` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory holding the config and the default database.
pub const PARTSXREF_DIR: &str = ".partsxref";

/// Environment variable overriding `database_path`.
pub const ENV_DATABASE: &str = "PARTSXREF_DATABASE";

/// Environment variable overriding the port of `listen_addr`.
pub const ENV_PORT: &str = "PORT";

/// Environment variable overriding `refresh_interval_secs`.
pub const ENV_REFRESH_SECS: &str = "PARTSXREF_REFRESH_SECS";

/// Configuration for a parts cross-reference project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XrefConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// SQLite database path; relative paths resolve against the project root.
    pub database_path: String,
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Maximum number of records (and ranked identifiers) per search.
    pub result_cap: usize,
    /// Trigram similarity an identifier must exceed for the fuzzy tier.
    pub fuzzy_threshold: f32,
    /// Whether an exact search for an unknown identifier falls back to
    /// fuzzy ranking.
    pub fuzzy_fallback: bool,
    /// Maximum identifiers visited while resolving one family.
    pub max_family_size: usize,
    /// Seconds between background refreshes; 0 disables them.
    pub refresh_interval_secs: u64,
}

impl Default for XrefConfig {
    fn default() -> Self {
        Self {
            version: 1,
            database_path: format!("{PARTSXREF_DIR}/parts.db"),
            listen_addr: "0.0.0.0:3000".to_string(),
            result_cap: DEFAULT_RESULT_CAP,
            fuzzy_threshold: DEFAULT_THRESHOLD,
            fuzzy_fallback: true,
            max_family_size: 10_000,
            refresh_interval_secs: 300,
        }
    }
}

impl XrefConfig {
    /// Resolves `database_path` against `project_root`.
    pub fn database_path(&self, project_root: &Path) -> PathBuf {
        let path = Path::new(&self.database_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    }

    /// Parses `listen_addr`.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| XrefError::Config {
            message: format!("invalid listen address '{}': {}", self.listen_addr, e),
        })
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DATABASE) {
            self.database_path = path;
        }

        if let Some(port) = get(ENV_PORT) {
            let port: u16 = port.trim().parse().map_err(|e| XrefError::Config {
                message: format!("invalid {ENV_PORT} value '{port}': {e}"),
            })?;
            let mut addr = self.socket_addr()?;
            addr.set_port(port);
            self.listen_addr = addr.to_string();
        }

        if let Some(secs) = get(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = secs.trim().parse().map_err(|e| XrefError::Config {
                message: format!("invalid {ENV_REFRESH_SECS} value '{secs}': {e}"),
            })?;
        }

        Ok(())
    }
}

/// Returns the path to the `.partsxref` directory within the given project root.
pub fn get_partsxref_dir(project_root: &Path) -> PathBuf {
    project_root.join(PARTSXREF_DIR)
}

/// Returns the path to the configuration file within the `.partsxref` directory.
pub fn get_config_path(project_root: &Path) -> PathBuf {
    get_partsxref_dir(project_root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns the default
/// configuration. Missing fields in an existing file take their defaults.
pub fn load_config(project_root: &Path) -> Result<XrefConfig> {
    let config_path = get_config_path(project_root);

    if !config_path.exists() {
        return Ok(XrefConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| XrefError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: XrefConfig = serde_json::from_str(&contents).map_err(|e| XrefError::Config {
        message: format!(
            "failed to parse config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it to the final location,
/// ensuring that a partial write never corrupts the configuration.
pub fn save_config(project_root: &Path, config: &XrefConfig) -> Result<()> {
    let dir = get_partsxref_dir(project_root);
    fs::create_dir_all(&dir).map_err(|e| XrefError::Config {
        message: format!("failed to create directory '{}': {}", dir.display(), e),
    })?;

    let config_path = get_config_path(project_root);
    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| XrefError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| XrefError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, &config_path).map_err(|e| XrefError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}
