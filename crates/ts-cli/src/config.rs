//! Where the timesheet lives on disk.
//!
//! Settings are layered, later sources winning:
//! built-in defaults, `<config_dir>/timesheet/config.toml`, the file given
//! with `--config`, then `TS_*` environment variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "timesheet";
const ENV_PREFIX: &str = "TS_";

/// CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Timesheet database file. Its parent directory is created on open.
    pub database_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR));
        Self {
            database_path: data_dir.join("timesheet.db"),
        }
    }
}

impl Config {
    /// Loads settings, reading `config_path` on top of the user config file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let figment = user_config_file()
            .into_iter()
            .chain(config_path.map(Path::to_path_buf))
            .fold(Figment::from(Serialized::defaults(Self::default())), |figment, file| {
                figment.merge(Toml::file(file))
            });

        figment.merge(Env::prefixed(ENV_PREFIX)).extract()
    }
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
