//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order
const PROJECT_CONFIG_FILES: [&str; 2] = ["roundtable.toml", ".roundtable.toml"];

/// Prefix for environment overrides, e.g. `ROUNDTABLE_ROUNDTABLE__TIMEOUT_SECONDS`
const ENV_PREFIX: &str = "ROUNDTABLE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. `ROUNDTABLE_`-prefixed environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./roundtable.toml` or `./.roundtable.toml`
    /// 4. Global: `~/.config/roundtable/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let config: FileConfig = Self::figment(config_path)
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// The merged provider stack, before extraction
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/roundtable/config.toml` if set,
    /// otherwise the platform config dir equivalent.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("roundtable").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {}* (sections separated by __)", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./roundtable.toml or ./.roundtable.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
