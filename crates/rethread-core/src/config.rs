use crate::error::{CycleError, Result};
use crate::paths;
use crate::rotation::RoleRotation;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON documents under `.rethread/state/`.
    #[default]
    File,
    /// Nothing survives the process.
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

// ---------------------------------------------------------------------------
// MirrorConfig
// ---------------------------------------------------------------------------

/// Where the GitHub contents-API mirror writes its JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_mirror_path")]
    pub path: String,
    /// Environment variable holding the API token. The token itself never
    /// lives in the config file.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_mirror_path() -> String {
    "data/dashboard.json".to_string()
}

fn default_token_env() -> String {
    "RETHREAD_GITHUB_TOKEN".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            owner: "moazelhag".to_string(),
            repo: "ReThread".to_string(),
            path: default_mirror_path(),
            token_env: default_token_env(),
            api_base: default_api_base(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Assignment used until the team edits or swaps roles.
    #[serde(default)]
    pub rotation: RoleRotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorConfig>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            storage: StorageConfig::default(),
            rotation: RoleRotation::default(),
            mirror: None,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CycleError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "project.name is empty".to_string(),
            });
        }

        for (slot, a) in [("week_a", &self.rotation.week_a), ("week_b", &self.rotation.week_b)] {
            if a.lead.trim().is_empty() || a.challenger.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("rotation.{slot} has a blank lead or challenger"),
                });
            } else if a.lead == a.challenger {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "rotation.{slot}: '{}' is both lead and challenger",
                        a.lead
                    ),
                });
            }
        }

        if let Some(mirror) = &self.mirror {
            for (field, value) in [
                ("owner", &mirror.owner),
                ("repo", &mirror.repo),
                ("path", &mirror.path),
                ("api_base", &mirror.api_base),
            ] {
                if value.trim().is_empty() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("mirror.{field} is empty"),
                    });
                }
            }
            if std::env::var_os(&mirror.token_env).is_none() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "mirror token variable {} is not set; remote sync will be skipped",
                        mirror.token_env
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
