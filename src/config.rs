use crate::skills::SkillCatalog;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    pub submit: SubmitConfig,
    pub credentials: Option<Credentials>,
    pub project_id: Option<String>,
    /// Replaces the built-in catalog when present
    pub skills: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub store: String,
    pub project: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub delay_ms: u64,
    pub mood: u8,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Where the login credentials for this run came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CredentialSource {
    Static,
    Cli,
}

/// How the project id for this run is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectSource {
    Static(String),
    Cli(String),
    AutoResolve,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            login: "https://vtuapi.internyet.in/api/v1/auth/login".to_string(),
            store: "https://vtuapi.internyet.in/api/v1/student/project-diaries/store".to_string(),
            project: "https://vtuapi.internyet.in/api/v1/student/my-project".to_string(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        SubmitConfig {
            delay_ms: 1500,
            mood: 5,
            timeout_secs: 30,
        }
    }
}

impl SubmitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load config from an explicit path, or from ~/.diary-sync/config.toml if it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default file
    /// falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Config file does not exist: {}", p.display());
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Ok(p) if p.exists() => p,
                _ => return Ok(Config::default()),
            },
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        log::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn default_path() -> Result<PathBuf> {
        let home = std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .context("Neither USERPROFILE nor HOME environment variable is set")?;

        Ok(PathBuf::from(home).join(".diary-sync").join("config.toml"))
    }

    pub fn skill_catalog(&self) -> SkillCatalog {
        match self.skills {
            Some(ref skills) => SkillCatalog::from_pairs(skills.clone()),
            None => SkillCatalog::default(),
        }
    }

    /// CLI credentials win when both are given, otherwise fall back to `[credentials]`
    pub fn credentials(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<(Credentials, CredentialSource)> {
        match (email, password) {
            (Some(email), Some(password)) => {
                Ok((Credentials { email, password }, CredentialSource::Cli))
            }
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--email and --password must be given together")
            }
            (None, None) => self
                .credentials
                .clone()
                .map(|c| (c, CredentialSource::Static))
                .context(
                    "No credentials: pass --email and --password or set [credentials] in the config file",
                ),
        }
    }

    pub fn project_source(&self, cli_project_id: Option<String>) -> ProjectSource {
        if let Some(id) = cli_project_id {
            ProjectSource::Cli(id)
        } else if let Some(ref id) = self.project_id {
            ProjectSource::Static(id.clone())
        } else {
            ProjectSource::AutoResolve
        }
    }
}
