use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "SHADERBITS_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "SHADERBITS_DATA_DIR";
pub const ENV_CACHE_DIR: &str = "SHADERBITS_CACHE_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "ShaderBits";
const APPLICATION: &str = "shaderbits";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl AppPaths {
    /// Platform directories, each replaceable through its environment
    /// variable. Nothing is created on disk.
    pub fn discover() -> Result<Self> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION);
        let pick = |var: &str, default: Option<&Path>| -> Result<PathBuf> {
            env_override(var)
                .or_else(|| default.map(Path::to_path_buf))
                .ok_or_else(|| anyhow!("failed to determine user directories; set {var}"))
        };

        Ok(Self {
            config_dir: pick(ENV_CONFIG_DIR, project_dirs.as_ref().map(|d| d.config_dir()))?,
            data_dir: pick(ENV_DATA_DIR, project_dirs.as_ref().map(|d| d.data_dir()))?,
            cache_dir: pick(ENV_CACHE_DIR, project_dirs.as_ref().map(|d| d.cache_dir()))?,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(presets::CONFIG_FILE_NAME)
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}
