//! Named strategy/career profiles stored as JSON under
//! `$HOME/.strategy-sim/profiles`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::career::CareerConfig;
use crate::error::{SimError, SimResult};
use crate::strategy::StrategyOverrides;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    /// Strategy used by `session` runs.
    pub strategy: StrategyOverrides,
    pub career: CareerConfig,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            name: "default".to_string(),
            strategy: StrategyOverrides::default(),
            career: CareerConfig::default(),
        }
    }
}

impl Profile {
    pub fn validate(&self) -> SimResult<()> {
        if self.name.is_empty() || self.name.contains(['/', '\\']) {
            return Err(SimError::InvalidConfig(format!(
                "bad profile name {:?}",
                self.name
            )));
        }
        self.strategy.validate()?;
        self.career.validate()
    }

    pub fn save(&self) -> SimResult<PathBuf> {
        self.save_in(&profiles_dir())
    }

    pub fn save_in(&self, dir: &Path) -> SimResult<PathBuf> {
        self.validate()?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.name));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        debug!(path = %path.display(), "profile saved");
        Ok(path)
    }

    pub fn load(name: &str) -> SimResult<Self> {
        Self::load_from(&profiles_dir(), name)
    }

    pub fn load_from(dir: &Path, name: &str) -> SimResult<Self> {
        let path = dir.join(format!("{}.json", name));
        if !path.exists() {
            return Err(SimError::ProfileNotFound(name.to_string()));
        }
        let json = std::fs::read_to_string(&path)?;
        let profile: Profile = serde_json::from_str(&json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn list() -> SimResult<Vec<String>> {
        Self::list_in(&profiles_dir())
    }

    /// Profile names in `dir`, sorted. A missing directory lists nothing.
    pub fn list_in(dir: &Path) -> SimResult<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn profiles_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".strategy-sim").join("profiles")
}
