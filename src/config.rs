use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::WorkflowArgs;
use crate::error::ConfigError;
use crate::tracker::DEFAULT_API_URL;

pub const GIT_SECTION: &str = "bushy-pivotal";
pub const PLATFORM_KEY: &str = "bushy.platform";
pub const SUPPORTED_PLATFORM: &str = "pivotal";
pub const DEFAULT_INTEGRATION_BRANCH: &str = "master";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `.bushy` under `home`; holds the config file and the logs.
pub fn bushy_dir_in(home: &Path) -> PathBuf {
    home.join(".bushy")
}

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| bushy_dir_in(&home).join(CONFIG_FILE_NAME))
}

/// Settings that can come from git config or the user config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiToken,
    ProjectId,
    FullName,
    IntegrationBranch,
    OnlyMine,
    ApiUrl,
}

impl ConfigKey {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ApiToken => "api-token",
            ConfigKey::ProjectId => "project-id",
            ConfigKey::FullName => "full-name",
            ConfigKey::IntegrationBranch => "integration-branch",
            ConfigKey::OnlyMine => "only-mine",
            ConfigKey::ApiUrl => "api-url",
        }
    }

    pub fn git_key(&self) -> String {
        format!("{GIT_SECTION}.{}", self.name())
    }
}

/// `~/.bushy/config.toml`
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub api_token: Option<String>,
    pub project_id: Option<u64>,
    pub full_name: Option<String>,
    pub integration_branch: Option<String>,
    pub only_mine: Option<bool>,
    pub api_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::ApiToken => self.api_token.clone(),
            ConfigKey::ProjectId => self.project_id.map(|id| id.to_string()),
            ConfigKey::FullName => self.full_name.clone(),
            ConfigKey::IntegrationBranch => self.integration_branch.clone(),
            ConfigKey::OnlyMine => self.only_mine.map(|flag| flag.to_string()),
            ConfigKey::ApiUrl => self.api_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_token: String,
    pub project_id: u64,
    pub full_name: String,
    pub integration_branch: String,
    pub only_mine: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub api_url: String,
}

impl Settings {
    /// The name stories are claimed and looked up under.
    pub fn owner(&self) -> Result<&str, ConfigError> {
        match self.full_name.trim() {
            "" => Err(ConfigError::MissingFullName),
            name => Ok(name),
        }
    }
}

/// Resolve settings from the user's git config and `~/.bushy/config.toml`.
pub fn load_settings(args: &WorkflowArgs) -> Result<Settings> {
    let file = match user_config_path() {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    resolve(args, crate::git::config_get, &file)
}

/// Flags win; git config is consulted only for flags that were not given,
/// then the config file, then defaults.
pub fn resolve(
    args: &WorkflowArgs,
    git_config: impl Fn(&str) -> Result<Option<String>>,
    file: &FileConfig,
) -> Result<Settings> {
    if let Some(platform) = git_config(PLATFORM_KEY)? {
        if platform != SUPPORTED_PLATFORM {
            return Err(ConfigError::UnsupportedPlatform(platform).into());
        }
    }

    let lookup = |key: ConfigKey| -> Result<Option<String>> {
        match git_config(key.git_key().as_str())? {
            Some(value) => Ok(Some(value)),
            None => Ok(file.get(key)),
        }
    };
    let flag_or = |flag: &Option<String>, key: ConfigKey| -> Result<Option<String>> {
        match flag.as_deref().map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Ok(Some(value.to_string())),
            None => lookup(key),
        }
    };

    let api_token = flag_or(&args.api_token, ConfigKey::ApiToken)?;
    let project_id = flag_or(&args.project_id, ConfigKey::ProjectId)?;
    let (Some(api_token), Some(project_id)) = (api_token, project_id) else {
        return Err(ConfigError::MissingCredentials.into());
    };
    let project_id = project_id
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidProjectId(project_id.clone()))?;

    let only_mine = if args.only_mine {
        true
    } else {
        match lookup(ConfigKey::OnlyMine)? {
            Some(value) => parse_bool(ConfigKey::OnlyMine, &value)?,
            None => false,
        }
    };

    Ok(Settings {
        api_token,
        project_id,
        full_name: flag_or(&args.full_name, ConfigKey::FullName)?.unwrap_or_default(),
        integration_branch: flag_or(&args.integration_branch, ConfigKey::IntegrationBranch)?
            .unwrap_or_else(|| DEFAULT_INTEGRATION_BRANCH.to_string()),
        only_mine,
        quiet: args.quiet,
        verbose: args.verbose,
        api_url: lookup(ConfigKey::ApiUrl)?.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
    })
}

/// git's boolean spellings
fn parse_bool(key: ConfigKey, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.git_key(),
            value: value.to_string(),
        }),
    }
}
