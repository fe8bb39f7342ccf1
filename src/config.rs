use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::iter::DEFAULT_PAGE_SIZE;
use crate::merge::Denylist;
use crate::{Error, Result};

/// Profile available when no config file exists
pub const DEFAULT_PROFILE: &str = "dev";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigratorConfig {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub database: String,
    pub page_size: Option<usize>,
    #[serde(default)]
    pub extra_denylist: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            database: "migrator.db".to_string(),
            page_size: None,
            extra_denylist: Vec::new(),
        }
    }
}

impl Profile {
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database)
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Built-in denylist extended with this profile's entries
    pub fn denylist(&self) -> Denylist {
        Denylist::builtin_with(self.extra_denylist.iter().cloned())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("migrator.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<MigratorConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: MigratorConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Pick the named profile.
///
/// Without a config file only the default profile exists.
pub fn select_profile(config: Option<&MigratorConfig>, name: &str) -> Result<Profile> {
    if name.is_empty() {
        return Err(Error::Config("Please specify a profile via -c".to_string()));
    }

    match config {
        Some(config) => config
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Config(format!("unknown profile '{}'", name))),
        None if name == DEFAULT_PROFILE => Ok(Profile::default()),
        None => Err(Error::Config(format!(
            "unknown profile '{}' (no config file found)",
            name
        ))),
    }
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
