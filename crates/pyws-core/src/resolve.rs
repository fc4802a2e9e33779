//! Picking the project directory a launch (or maintenance task) runs against.
//!
//! The first command-line token selects the project:
//! - nothing, `.` or `--`: walk upward from the working directory to the
//!   nearest directory holding the manifest marker;
//! - `-h` / `--help`: hand over to the tool's own help;
//! - anything else: an immediate subdirectory of the workspace root.

use crate::config::Settings;
use crate::error::{PywsError, Result};
use crate::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const CURRENT_MARKER: &str = ".";
pub const ARG_SEPARATOR: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Current,
    Named(String),
    Help,
}

/// Parsed command line of a launch: which project, and what the tool gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: Target,
    pub passthrough: Vec<String>,
}

impl Invocation {
    pub fn parse(tokens: &[String]) -> Self {
        let Some((first, rest)) = tokens.split_first() else {
            return Self {
                target: Target::Current,
                passthrough: Vec::new(),
            };
        };

        let target = match first.as_str() {
            "-h" | "--help" => Target::Help,
            CURRENT_MARKER | ARG_SEPARATOR => Target::Current,
            name => Target::Named(name.to_string()),
        };

        // `pyws launch name -- -i script.py` drops the separator.
        let rest = match rest.split_first() {
            Some((sep, tail)) if sep == ARG_SEPARATOR && *first != ARG_SEPARATOR => tail,
            _ => rest,
        };

        Self {
            target,
            passthrough: rest.to_vec(),
        }
    }
}

/// Nearest directory at or above `start` that contains `marker`.
pub fn find_project_root(start: &Path, marker: &str) -> Result<PathBuf> {
    if !marker.is_empty() {
        if let Some(dir) = start.ancestors().find(|d| d.join(marker).exists()) {
            tracing::debug!(dir = %dir.display(), marker, "found project root");
            return Ok(dir.to_path_buf());
        }
    }
    Err(PywsError::MarkerNotFound {
        marker: marker.to_string(),
        start: start.to_path_buf(),
    })
}

/// `<workspace_root>/<name>`, which must be an existing directory.
pub fn lookup_named(workspace_root: &Path, name: &str) -> Result<PathBuf> {
    // Only immediate children qualify; no climbing out of the workspace.
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');
    let dir = workspace_root.join(name);
    if !is_plain || !dir.is_dir() {
        return Err(PywsError::EnvironmentNotFound(name.to_string()));
    }
    Ok(dir)
}

/// Resolve a non-help target to a project directory.
pub fn resolve_target(target: &Target, cwd: &Path, settings: &Settings) -> Result<PathBuf> {
    match target {
        Target::Named(name) => lookup_named(&settings.workspace_root, name),
        Target::Current | Target::Help => find_project_root(cwd, &settings.manifest),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything a single launch learns from the filesystem.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub requested_name: Option<String>,
    pub resolved_directory: PathBuf,
    pub has_isolated_environment: bool,
    pub has_profile_directory: bool,
}

impl Session {
    pub fn probe(requested_name: Option<String>, dir: PathBuf, settings: &Settings) -> Self {
        let has_isolated_environment =
            paths::activate_script(&dir, &settings.env_dir).is_file();
        let has_profile_directory = paths::profile_dir(&dir, &settings.profile_dir).is_dir();
        Self {
            requested_name,
            resolved_directory: dir,
            has_isolated_environment,
            has_profile_directory,
        }
    }

    /// Resolve `target` and probe the resulting directory.
    pub fn open(target: &Target, cwd: &Path, settings: &Settings) -> Result<Self> {
        let dir = resolve_target(target, cwd, settings)?;
        let requested = match target {
            Target::Named(name) => Some(name.clone()),
            _ => None,
        };
        Ok(Self::probe(requested, dir, settings))
    }

    pub fn activate_script(&self, settings: &Settings) -> PathBuf {
        paths::activate_script(&self.resolved_directory, &settings.env_dir)
    }

    pub fn profile_dir(&self, settings: &Settings) -> PathBuf {
        paths::profile_dir(&self.resolved_directory, &settings.profile_dir)
    }
}
