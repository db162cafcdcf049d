use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Process configuration, loaded once at startup and passed by reference
/// into every entry point. There is no global; a previous iteration of this
/// kept config behind a `lazy_static` `RwLock`, which made every call site
/// implicitly depend on load order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub db_conn: String,
    pub workers: usize,
    pub insert_deadline_secs: u64,
    pub generate_deadline_secs: u64,
    pub extract_deadline_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("./export"),
            db_conn: "audiodex.sqlite3".to_string(),
            workers: 4,
            insert_deadline_secs: 8,
            generate_deadline_secs: 360,
            extract_deadline_secs: 120,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("net", "audiodex", "Audiodex").context("failed to resolve config directories")
}

/// Loads the on-disk config, creating a default one if none exists yet.
/// Never consults or populates process-wide state.
pub fn load() -> Result<Config> {
    let pd = project_dirs()?;
    std::fs::create_dir_all(pd.config_dir())?;
    let path = pd.config_dir().join("config.yml");

    let config = match std::fs::read_to_string(&path) {
        Ok(contents) => serde_yaml::from_str(&contents).context("failed to parse config.yml")?,
        Err(_) => {
            let config = Config::default();
            persist(&config)?;
            config
        }
    };

    Ok(config)
}

pub fn persist(config: &Config) -> Result<()> {
    let pd = project_dirs()?;
    std::fs::create_dir_all(pd.config_dir())?;
    let path = pd.config_dir().join("config.yml");
    std::fs::write(path, serde_yaml::to_string(config)?)?;
    Ok(())
}

/// Applies environment and CLI overrides on top of the loaded config, in
/// that order, per the `DATA`/`DB_CONN` env fallbacks named in the CLI
/// surface.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(data) = std::env::var("DATA") {
        config.data_dir = PathBuf::from(data);
    }
    if let Ok(db_conn) = std::env::var("DB_CONN") {
        config.db_conn = db_conn;
    }
    config
}
