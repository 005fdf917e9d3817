use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "mdtext_config.toml";
pub const CONFIG_PATH_ENV: &str = "MDTEXT_CONFIG_PATH";
const ENV_PREFIX: &str = "MDTEXT_";

/// Upload limit carried over from the web converter: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

fn default_allowed_extensions() -> Vec<String> {
    ["md", "markdown", "txt"].iter().map(|ext| ext.to_string()).collect()
}

fn default_output_extension() -> String {
    "txt".to_string()
}

/// Gate applied to files before they are converted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    /// Accepted extensions, compared case-insensitively and without the dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_max_file_size_bytes() -> u64 {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl InputConfig {
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Directory that receives converted files. When unset, each result is
    /// written next to its source file.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_output_extension")]
    pub file_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_extension: default_output_extension(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MdTextConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Location of the per-user config file, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "mdtext", "mdtext").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Loads configuration from defaults, the user config file, the working
/// directory (or `MDTEXT_CONFIG_PATH`) and `MDTEXT_*` environment variables,
/// later layers overriding earlier ones.
pub fn load_config() -> Result<MdTextConfig> {
    load_config_from(user_config_path().as_deref())
}

/// Same layering as [`load_config`], with an explicit user config file
/// (`None` skips that layer).
pub fn load_config_from(user_config: Option<&Path>) -> Result<MdTextConfig> {
    let config_path_env = std::env::var(CONFIG_PATH_ENV).ok();
    let config_path = config_path_env.clone().unwrap_or_else(|| CONFIG_FILENAME.to_string());

    if let Some(ref env_path) = config_path_env {
        if !Path::new(env_path).exists() {
            return Err(anyhow::anyhow!("Config file not found at {}: {}", CONFIG_PATH_ENV, env_path));
        }
        log::info!("{} is set: {}", CONFIG_PATH_ENV, env_path);
    } else {
        log::debug!("{} not set, falling back to default: {}", CONFIG_PATH_ENV, config_path);
    }

    let mut figment = Figment::new().merge(Serialized::defaults(MdTextConfig::default()));
    if let Some(user_path) = user_config {
        log::debug!("Merging user config file {:?} if present", user_path);
        figment = figment.merge(Toml::file(user_path));
    }
    let figment = figment
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: MdTextConfig = figment.extract().context("Failed to extract MdTextConfig")?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &MdTextConfig) -> Result<()> {
    if config.input.max_file_size_bytes == 0 {
        return Err(anyhow::anyhow!("input.max_file_size_bytes must be greater than zero"));
    }
    if config.input.allowed_extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
        return Err(anyhow::anyhow!("input.allowed_extensions must name at least one extension"));
    }
    if config.output.file_extension.trim_start_matches('.').is_empty() {
        return Err(anyhow::anyhow!("output.file_extension cannot be empty"));
    }
    if let Some(dir) = &config.output.output_dir {
        if dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Configured output.output_dir cannot be empty"));
        }
    }
    Ok(())
}
