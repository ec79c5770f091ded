/*
 * Manages the persisted tree settings: hidden-item visibility, the
 * system-item filter, the pinned-to-namespace filter, and the sibling sort
 * flavor. Settings are stored as JSON in the platform's local configuration
 * directory for the application.
 *
 * A trait-based approach (`SettingsStoreOperations`) allows different
 * storage backends or mock implementations for testing. The concrete
 * implementation (`CoreSettingsStore`) resolves the directory through
 * `directories::ProjectDirs` and creates it on first save.
 */
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

const SETTINGS_FILENAME: &str = "tree_settings.json";

/*
 * The behavior switches of the tree engine. Defaults follow the source
 * control's shipped behavior: hidden items shown, system items shown,
 * the pinned filter off, natural sort on.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSettings {
    pub show_hidden: bool,
    pub hide_system_items: bool,
    pub pinned_filter: bool,
    pub use_natural_sort: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        TreeSettings {
            show_hidden: true,
            hide_system_items: false,
            pinned_filter: false,
            use_natural_sort: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Settings I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Settings serialization error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            ConfigError::NoConfigDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait SettingsStoreOperations: Send + Sync {
    fn load_settings(&self, app_name: &str) -> Result<TreeSettings>;
    fn save_settings(&self, app_name: &str, settings: &TreeSettings) -> Result<()>;
}

pub struct CoreSettingsStore {}

impl CoreSettingsStore {
    pub fn new() -> Self {
        CoreSettingsStore {}
    }

    fn settings_file_path(app_name: &str) -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("", "", app_name).ok_or(ConfigError::NoConfigDirectory)?;
        let config_dir = project_dirs.config_local_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            log::debug!("CoreSettingsStore: Created config directory {config_dir:?}");
        }
        Ok(config_dir.join(SETTINGS_FILENAME))
    }
}

impl Default for CoreSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStoreOperations for CoreSettingsStore {
    /*
     * Loads the persisted settings. A missing file yields the defaults; a
     * malformed file is an error the caller decides how to surface (the
     * engine itself never panics over configuration).
     */
    fn load_settings(&self, app_name: &str) -> Result<TreeSettings> {
        let file_path = Self::settings_file_path(app_name)?;
        if !file_path.exists() {
            log::debug!("CoreSettingsStore: {file_path:?} does not exist, using defaults.");
            return Ok(TreeSettings::default());
        }

        let file = fs::File::open(&file_path)?;
        let reader = io::BufReader::new(file);
        let settings = serde_json::from_reader(reader)?;
        log::debug!("CoreSettingsStore: Loaded settings from {file_path:?}: {settings:?}");
        Ok(settings)
    }

    fn save_settings(&self, app_name: &str, settings: &TreeSettings) -> Result<()> {
        let file_path = Self::settings_file_path(app_name)?;
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&file_path, json)?;
        log::debug!("CoreSettingsStore: Saved settings to {file_path:?}");
        Ok(())
    }
}
