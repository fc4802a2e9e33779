//! Running the external helpers (virtualenv, pip, formatters) once each.
//!
//! Output is captured rather than streamed; on a non-zero exit the command
//! line, its exit code and everything it printed are returned in
//! [`PywsError::CommandFailed`].

use crate::error::{PywsError, Result};
use crate::launcher::exit_code;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

/// Human-readable command line for logs and error messages.
pub fn describe(program: &OsStr, args: &[String]) -> String {
    let mut parts = vec![program.to_string_lossy().into_owned()];
    parts.extend(args.iter().map(|a| {
        if a.contains(' ') {
            format!("'{a}'")
        } else {
            a.clone()
        }
    }));
    parts.join(" ")
}

/// Run `program args...` in `cwd` with stdin closed. Returns stdout followed
/// by stderr.
pub fn run_checked(program: impl AsRef<OsStr>, args: &[String], cwd: &Path) -> Result<String> {
    let program = program.as_ref();
    let line = describe(program, args);
    tracing::info!(command = %line, cwd = %cwd.display(), "running");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| PywsError::CommandFailed {
            command: line.clone(),
            code: -1,
            output: e.to_string(),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(PywsError::CommandFailed {
            command: line,
            code: exit_code(output.status),
            output: combined,
        });
    }
    Ok(combined)
}
