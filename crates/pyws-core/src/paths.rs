use crate::error::{PywsError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Layout defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_WORKSPACE_DIR: &str = "workspace";
pub const DEFAULT_MANIFEST: &str = "setup.py";
pub const DEFAULT_ENV_DIR: &str = ".venv";
pub const DEFAULT_PROFILE_DIR: &str = ".ipython_profile";
pub const DEFAULT_TOOL: &str = "ipython";
pub const DEFAULT_HISTORY_FILE: &str = ".ipython/profile_default/history.sqlite";

pub const CONFIG_FILE: &str = ".config/pyws/config.yaml";

pub const ENV_BIN_DIR: &str = "bin";
pub const ACTIVATE_SCRIPT: &str = "activate";

pub const TEMPLATE_PACKAGE_DIR: &str = "src/python";
pub const TEMPLATE_MAIN_MODULE: &str = "main";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn home_dir() -> Result<PathBuf> {
    home::home_dir().ok_or(PywsError::HomeNotFound)
}

pub fn default_workspace_root(home: &Path) -> PathBuf {
    home.join(DEFAULT_WORKSPACE_DIR)
}

pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

pub fn default_history_file(home: &Path) -> PathBuf {
    home.join(DEFAULT_HISTORY_FILE)
}

pub fn env_dir(project: &Path, env_dir: &str) -> PathBuf {
    project.join(env_dir)
}

pub fn env_bin_dir(project: &Path, env_dir: &str) -> PathBuf {
    self::env_dir(project, env_dir).join(ENV_BIN_DIR)
}

pub fn activate_script(project: &Path, env_dir: &str) -> PathBuf {
    env_bin_dir(project, env_dir).join(ACTIVATE_SCRIPT)
}

pub fn env_tool(project: &Path, env_dir: &str, tool: &str) -> PathBuf {
    env_bin_dir(project, env_dir).join(tool)
}

pub fn profile_dir(project: &Path, profile_dir: &str) -> PathBuf {
    project.join(profile_dir)
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap())
}

/// Package and module names end up as Python import names and directory
/// names under the workspace root.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(PywsError::InvalidProjectName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
