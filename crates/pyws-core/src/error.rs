use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PywsError {
    #[error("cannot find specified environment: {0}")]
    EnvironmentNotFound(String),

    #[error("cannot find project manifest '{marker}' in {start} or any parent directory")]
    MarkerNotFound { marker: String, start: PathBuf },

    #[error("tool not found: {0} (not in the project environment nor on PATH)")]
    ToolNotFound(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("invalid project name '{0}': must be a lowercase Python identifier")]
    InvalidProjectName(String),

    #[error("project already exists: {0}")]
    ProjectExists(PathBuf),

    #[error("template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("template is missing {0}")]
    TemplateInvalid(String),

    #[error("failed to activate environment {script}: {reason}")]
    ActivationFailed { script: PathBuf, reason: String },

    #[error("command failed with exit code {code}: {command}\n{output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PywsError>;
