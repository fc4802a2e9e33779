//! Scoped activation of a project's isolated environment.
//!
//! Instead of sourcing `activate` into our own process, we compute the
//! environment delta the script would make ([`EnvOverlay`]) and apply it to
//! the launched child only. The parent environment never changes, so there
//! is nothing to deactivate when the child exits, crashes or is interrupted.

use crate::error::{PywsError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::process::{Command, Stdio};

/// Variables a shell rewrites on its own; never part of an activation delta.
const SHELL_NOISE: &[&str] = &["_", "SHLVL", "PWD", "OLDPWD", "PS1"];

/// Exit code the sourcing wrapper uses when the activate script itself fails.
const SOURCE_FAILED: i32 = 97;

const SOURCE_SCRIPT: &str = r#". "$1" >/dev/null 2>&1 || exit 97; exec env -0"#;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    pub set: BTreeMap<String, String>,
    pub unset: BTreeSet<String>,
}

impl EnvOverlay {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.set.get(key).map(String::as_str)
    }

    /// Delta turning `before` into `after`, minus shell bookkeeping variables.
    pub fn diff(before: &BTreeMap<String, String>, after: &BTreeMap<String, String>) -> Self {
        let mut overlay = Self::default();
        for (key, value) in after {
            if is_noise(key) {
                continue;
            }
            if before.get(key) != Some(value) {
                overlay.set.insert(key.clone(), value.clone());
            }
        }
        for key in before.keys() {
            if !is_noise(key) && !after.contains_key(key) {
                overlay.unset.insert(key.clone());
            }
        }
        overlay
    }

    /// What a stock virtualenv `activate` does, for when no shell is around
    /// to source the real script.
    pub fn synthesized(env_root: &Path, current_path: Option<&str>) -> Self {
        let bin = env_root.join(crate::paths::ENV_BIN_DIR);
        let path = match current_path {
            Some(p) if !p.is_empty() => format!("{}:{}", bin.display(), p),
            _ => bin.display().to_string(),
        };

        let mut overlay = Self::default();
        overlay
            .set
            .insert("VIRTUAL_ENV".to_string(), env_root.display().to_string());
        overlay.set.insert("PATH".to_string(), path);
        overlay.unset.insert("PYTHONHOME".to_string());
        overlay
    }

    pub fn apply(&self, cmd: &mut Command) {
        for key in &self.unset {
            cmd.env_remove(key);
        }
        for (key, value) in &self.set {
            cmd.env(key, value);
        }
    }
}

fn is_noise(key: &str) -> bool {
    SHELL_NOISE.contains(&key) || key.starts_with("BASH_FUNC_")
}

fn current_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Parse the NUL-separated output of `env -0`.
fn parse_env_nul(bytes: &[u8]) -> BTreeMap<String, String> {
    bytes
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let text = String::from_utf8_lossy(entry);
            let (key, value) = text.split_once('=')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Compute the overlay of `script` by sourcing it in a throwaway `bash`.
pub fn source_with_bash(bash: &Path, script: &Path) -> Result<EnvOverlay> {
    let failed = |reason: String| PywsError::ActivationFailed {
        script: script.to_path_buf(),
        reason,
    };

    let output = Command::new(bash)
        .arg("-c")
        .arg(SOURCE_SCRIPT)
        .arg("pyws-activate")
        .arg(script)
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| failed(e.to_string()))?;

    if !output.status.success() {
        let reason = if output.status.code() == Some(SOURCE_FAILED) {
            "activation script exited with an error".to_string()
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("{} {}", output.status, stderr.trim())
        };
        return Err(failed(reason));
    }

    let after = parse_env_nul(&output.stdout);
    Ok(EnvOverlay::diff(&current_env(), &after))
}

/// Overlay for the environment whose `activate` script is at `script`.
pub fn activate(script: &Path) -> Result<EnvOverlay> {
    match which::which("bash") {
        Ok(bash) => {
            let overlay = source_with_bash(&bash, script)?;
            tracing::debug!(
                script = %script.display(),
                set = overlay.set.len(),
                unset = overlay.unset.len(),
                "sourced activation script"
            );
            Ok(overlay)
        }
        Err(_) => {
            // <env>/bin/activate -> <env>
            let env_root = script
                .parent()
                .and_then(Path::parent)
                .unwrap_or(Path::new("."));
            tracing::warn!(
                env = %env_root.display(),
                "bash not found, using a standard virtualenv activation"
            );
            let path = std::env::var("PATH").ok();
            Ok(EnvOverlay::synthesized(env_root, path.as_deref()))
        }
    }
}
