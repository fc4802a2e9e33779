//! Re-creating a project's environment and running its formatters.

use crate::config::Settings;
use crate::error::{PywsError, Result};
use crate::paths;
use crate::runner::{describe, run_checked};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extras installed alongside the project in editable mode.
pub const EDITABLE_TARGET: &str = ".[dev,test]";

#[derive(Debug, Clone, Serialize)]
pub struct StepOutput {
    pub command: String,
    pub output: String,
}

/// Program that creates the environment: `virtualenv` when available,
/// otherwise the interpreter's own `venv` module.
fn env_creator(env_dir: &str) -> Result<(PathBuf, Vec<String>)> {
    if let Ok(virtualenv) = which::which("virtualenv") {
        return Ok((virtualenv, vec![env_dir.to_string()]));
    }
    let python = which::which("python3")
        .or_else(|_| which::which("python"))
        .map_err(|_| PywsError::ToolNotFound("virtualenv or python3".to_string()))?;
    Ok((
        python,
        vec!["-m".to_string(), "venv".to_string(), env_dir.to_string()],
    ))
}

/// Delete and re-create `<project>/<env_dir>`, then install the project
/// into it in editable mode.
pub fn recreate_env(project: &Path, settings: &Settings) -> Result<Vec<StepOutput>> {
    let env = paths::env_dir(project, &settings.env_dir);
    if crate::io::remove_dir_if_exists(&env)? {
        tracing::info!(env = %env.display(), "removed existing environment");
    }

    let mut steps = Vec::new();

    let (creator, args) = env_creator(&settings.env_dir)?;
    let output = run_checked(&creator, &args, project)?;
    steps.push(StepOutput {
        command: describe(creator.as_os_str(), &args),
        output,
    });

    let pip = paths::env_tool(project, &settings.env_dir, "pip");
    let args = vec![
        "install".to_string(),
        "-e".to_string(),
        EDITABLE_TARGET.to_string(),
    ];
    let output = run_checked(&pip, &args, project)?;
    steps.push(StepOutput {
        command: describe(pip.as_os_str(), &args),
        output,
    });

    Ok(steps)
}

/// Run every configured formatter in order, stopping at the first failure.
/// Each formatter prefers its copy inside the project environment.
pub fn run_formatters(project: &Path, settings: &Settings) -> Result<Vec<StepOutput>> {
    let mut steps = Vec::with_capacity(settings.formatters.len());
    for formatter in &settings.formatters {
        let local = paths::env_tool(project, &settings.env_dir, &formatter.program);
        let program = if local.is_file() {
            local
        } else {
            PathBuf::from(&formatter.program)
        };
        let output = run_checked(&program, &formatter.args, project)?;
        steps.push(StepOutput {
            command: describe(program.as_os_str(), &formatter.args),
            output,
        });
    }
    Ok(steps)
}
