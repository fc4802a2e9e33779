//! Enumerating the projects under the workspace root.
//!
//! Used for shell completion, so it never fails on an absent root and does
//! no caching: the listing is a single `read_dir`.

use crate::config::Settings;
use crate::error::Result;
use crate::resolve::Session;
use std::path::Path;

/// Names of the immediate, non-hidden subdirectories of `root`, sorted,
/// optionally restricted to those starting with `prefix`.
pub fn list_projects(root: &Path, prefix: Option<&str>) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if prefix.is_some_and(|p| !name.starts_with(p)) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// [`list_projects`] with each entry probed like a launch would.
pub fn list_sessions(settings: &Settings, prefix: Option<&str>) -> Result<Vec<Session>> {
    let names = list_projects(&settings.workspace_root, prefix)?;
    Ok(names
        .into_iter()
        .map(|name| {
            let dir = settings.workspace_root.join(&name);
            Session::probe(Some(name), dir, settings)
        })
        .collect())
}
