//! Building and running the interactive tool for a resolved [`Session`].

use crate::activation::{self, EnvOverlay};
use crate::config::Settings;
use crate::error::{PywsError, Result};
use crate::paths;
use crate::resolve::Session;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

pub const NO_CONFIRM_EXIT: &str = "--no-confirm-exit";
pub const NO_BANNER: &str = "--no-banner";

/// A fully decided tool invocation. Nothing has been spawned yet.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub overlay: EnvOverlay,
}

impl LaunchPlan {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        self.overlay.apply(&mut cmd);
        cmd
    }

    /// Run in the foreground with inherited stdio and return the exit code.
    pub fn run(&self) -> Result<i32> {
        tracing::info!(
            program = %self.program.display(),
            args = ?self.args,
            activated = !self.overlay.is_empty(),
            "launching"
        );
        let status = self.command().status()?;
        let code = exit_code(status);
        tracing::debug!(code, "tool exited");
        Ok(code)
    }
}

/// Exit code of a finished child; signal deaths map to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

/// Prefer the copy of `tool` inside the project environment, then `PATH`.
pub fn resolve_tool(project: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    if let Some(project) = project {
        let local = paths::env_tool(project, &settings.env_dir, &settings.tool);
        if local.is_file() {
            return Ok(local);
        }
    }
    which::which(&settings.tool).map_err(|_| PywsError::ToolNotFound(settings.tool.clone()))
}

/// Arguments in launch order: profile, history, fixed flags, then the user's.
pub fn tool_args(session: &Session, settings: &Settings, passthrough: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(passthrough.len() + 4);
    if session.has_profile_directory {
        args.push(format!(
            "--profile-dir={}",
            session.profile_dir(settings).display()
        ));
    }
    args.push(format!(
        "--HistoryManager.hist_file={}",
        settings.history_file.display()
    ));
    args.push(NO_CONFIRM_EXIT.to_string());
    args.push(NO_BANNER.to_string());
    args.extend(passthrough.iter().cloned());
    args
}

pub fn plan_launch(
    session: &Session,
    settings: &Settings,
    passthrough: &[String],
) -> Result<LaunchPlan> {
    let overlay = if session.has_isolated_environment {
        activation::activate(&session.activate_script(settings))?
    } else {
        EnvOverlay::default()
    };
    let program = resolve_tool(Some(&session.resolved_directory), settings)?;
    Ok(LaunchPlan {
        program,
        args: tool_args(session, settings, passthrough),
        overlay,
    })
}

/// `<tool> --help`, using a project-local tool when `project` has one.
pub fn plan_help(project: Option<&Path>, settings: &Settings) -> Result<LaunchPlan> {
    Ok(LaunchPlan {
        program: resolve_tool(project, settings)?,
        args: vec!["--help".to_string()],
        overlay: EnvOverlay::default(),
    })
}
