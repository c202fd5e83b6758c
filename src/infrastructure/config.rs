use crate::domain::{
    config::{AppConfig, GlobalConfig, SerialConfig, TerminalConfig},
    error::{TermError, TermResult},
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = "serialterm";
const PROJECT_DIR: &str = ".serialterm";
const CONFIG_FILE: &str = "config.toml";

/// Configuration file as written, sections absent when not given
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    global: Option<GlobalConfig>,
    serial: Option<SerialConfig>,
    terminal: Option<TerminalConfig>,
}

impl ConfigLayer {
    fn apply(self, config: &mut AppConfig) {
        if let Some(global) = self.global {
            config.global = global;
        }
        if let Some(serial) = self.serial {
            config.serial = serial;
        }
        if let Some(terminal) = self.terminal {
            config.terminal = terminal;
        }
    }
}

/// Configuration manager
///
/// Reads the global file first, then lets a project file override whole
/// sections.
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a manager using the standard locations
    pub fn new() -> TermResult<Self> {
        let global_config_path = Self::default_global_config_path()?;
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Create a manager reading a single explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: path.into(),
            project_config_path: None,
        }
    }

    /// Load the merged configuration
    pub fn load_config(&self) -> TermResult<AppConfig> {
        let mut config = AppConfig::default();

        if self.global_config_path.exists() {
            debug!("Loading config from {}", self.global_config_path.display());
            Self::read_layer(&self.global_config_path)?.apply(&mut config);
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                debug!("Loading project config from {}", project_path.display());
                Self::read_layer(project_path)?.apply(&mut config);
            }
        }

        Ok(config)
    }

    /// Save the configuration to the project file if there is one,
    /// otherwise to the global file
    pub fn save_config(&self, config: &AppConfig) -> TermResult<()> {
        let path = self
            .project_config_path
            .as_ref()
            .unwrap_or(&self.global_config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TermError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        self.save_config_to_path(path, config)
    }

    fn default_global_config_path() -> TermResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| TermError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Find a project configuration by walking up from `start`
    pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    fn read_layer(path: &Path) -> TermResult<ConfigLayer> {
        let content = fs::read_to_string(path).map_err(|e| TermError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| TermError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Load a single file, filling missing sections with defaults
    pub fn load_config_from_path(&self, path: &Path) -> TermResult<AppConfig> {
        let mut config = AppConfig::default();
        Self::read_layer(path)?.apply(&mut config);
        Ok(config)
    }

    pub fn save_config_to_path(&self, path: &Path, config: &AppConfig) -> TermResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| TermError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| TermError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default project configuration under `path`
    pub fn init_project_config(&self, path: &Path) -> TermResult<PathBuf> {
        let config_dir = path.join(PROJECT_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(TermError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| TermError::Config {
            message: format!("Failed to create {} directory: {}", PROJECT_DIR, e),
        })?;

        let default_config = AppConfig {
            serial: SerialConfig::new(default_port_name(), 115200),
            ..AppConfig::default()
        };
        self.save_config_to_path(&config_file, &default_config)?;

        Ok(config_file)
    }

    /// Check a configuration file and return the problems found
    pub fn validate(&self, config: &AppConfig) -> Vec<String> {
        let mut problems = Vec::new();

        if config.global.log_level.parse::<tracing::Level>().is_err() {
            problems.push(format!("unknown log level '{}'", config.global.log_level));
        }
        // An empty port is resolved at connect time
        if !config.serial.port.is_empty() {
            if let Err(e) = config.serial.validate() {
                problems.push(e.to_string());
            }
        }
        if config.terminal.hex_view.bytes_per_row == 0 {
            problems.push("hex_view.bytes_per_row must be positive".to_string());
        }

        problems
    }

    pub fn project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    pub fn global_config_path(&self) -> &PathBuf {
        &self.global_config_path
    }
}

fn default_port_name() -> &'static str {
    if cfg!(windows) {
        "COM1"
    } else {
        "/dev/ttyUSB0"
    }
}
