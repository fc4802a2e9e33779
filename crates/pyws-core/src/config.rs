use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

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
// FormatterCommand
// ---------------------------------------------------------------------------

/// One formatter or linter run by `pyws format`, e.g. `black src tests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatterCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl FormatterCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

fn default_formatters() -> Vec<FormatterCommand> {
    vec![
        FormatterCommand::new("black", &["src", "tests"]),
        FormatterCommand::new("flake8", &["src", "tests"]),
    ]
}

fn default_manifest() -> String {
    paths::DEFAULT_MANIFEST.to_string()
}

fn default_env_dir() -> String {
    paths::DEFAULT_ENV_DIR.to_string()
}

fn default_profile_dir() -> String {
    paths::DEFAULT_PROFILE_DIR.to_string()
}

fn default_tool() -> String {
    paths::DEFAULT_TOOL.to_string()
}

// ---------------------------------------------------------------------------
// Config (file form)
// ---------------------------------------------------------------------------

/// Contents of `~/.config/pyws/config.yaml`. Every field is optional in the
/// file; paths that depend on the home directory stay unset until
/// [`Config::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_env_dir")]
    pub env_dir: String,
    #[serde(default = "default_profile_dir")]
    pub profile_dir: String,
    #[serde(default = "default_tool")]
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    #[serde(default = "default_formatters")]
    pub formatters: Vec<FormatterCommand>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_root: None,
            manifest: default_manifest(),
            env_dir: default_env_dir(),
            profile_dir: default_profile_dir(),
            tool: default_tool(),
            history_file: None,
            template_dir: None,
            formatters: default_formatters(),
        }
    }
}

/// Values that beat the config file: CLI flags and their env-var fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workspace_root: Option<PathBuf>,
    pub tool: Option<String>,
    pub history_file: Option<PathBuf>,
}

impl Config {
    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        // An empty file deserializes to unit, not to a mapping.
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Defaults with the home-relative paths spelled out, for `config init`.
    pub fn starter(home: &Path) -> Self {
        Self {
            workspace_root: Some(paths::default_workspace_root(home)),
            history_file: Some(paths::default_history_file(home)),
            ..Self::default()
        }
    }

    /// Apply `overrides` and fill in home-relative defaults.
    pub fn resolve(self, home: &Path, overrides: Overrides) -> Settings {
        let workspace_root = overrides
            .workspace_root
            .or(self.workspace_root)
            .map(|p| expand_home(&p, home))
            .unwrap_or_else(|| paths::default_workspace_root(home));
        let history_file = overrides
            .history_file
            .or(self.history_file)
            .map(|p| expand_home(&p, home))
            .unwrap_or_else(|| paths::default_history_file(home));

        Settings {
            workspace_root,
            manifest: self.manifest,
            env_dir: self.env_dir,
            profile_dir: self.profile_dir,
            tool: overrides.tool.unwrap_or(self.tool),
            history_file,
            template_dir: self.template_dir.map(|p| expand_home(&p, home)),
            formatters: self.formatters,
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Settings (effective)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub workspace_root: PathBuf,
    pub manifest: String,
    pub env_dir: String,
    pub profile_dir: String,
    pub tool: String,
    pub history_file: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub formatters: Vec<FormatterCommand>,
}

impl Settings {
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.manifest.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "manifest is empty; the upward project search cannot match".to_string(),
            });
        }

        if self.tool.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tool is empty".to_string(),
            });
        }

        if !self.workspace_root.is_dir() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "workspace root {} does not exist",
                    self.workspace_root.display()
                ),
            });
        }

        if let Some(template) = &self.template_dir {
            if !template.is_dir() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "template_dir {} does not exist; `new` will fail",
                        template.display()
                    ),
                });
            }
        }

        for f in &self.formatters {
            if f.program.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "formatter with an empty program".to_string(),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
