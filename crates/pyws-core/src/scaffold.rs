//! Creating a new project directory from a template.
//!
//! A template is a plain directory tree whose package lives in `src/python`
//! with its entry module `main.py`. After copying, `src/python` becomes
//! `src/<package>` and `main.py` becomes `<module>.py`, where the module
//! defaults to the package name. Nothing inside the files is rewritten.

use crate::error::{PywsError, Result};
use crate::{io, paths};
use rust_embed::Embed;
use std::path::{Path, PathBuf};

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/templates/python/"]
struct BuiltinTemplate;

#[derive(Debug, Clone)]
pub struct NewProject {
    pub package: String,
    pub module: String,
    /// Directory the project is created in, usually the workspace root.
    pub parent: PathBuf,
}

impl NewProject {
    pub fn new(package: impl Into<String>, parent: impl Into<PathBuf>) -> Self {
        let package = package.into();
        Self {
            module: package.clone(),
            package,
            parent: parent.into(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn target(&self) -> PathBuf {
        self.parent.join(&self.package)
    }
}

fn main_file() -> String {
    format!("{}.py", paths::TEMPLATE_MAIN_MODULE)
}

fn check_template_dir(template: &Path) -> Result<()> {
    if !template.is_dir() {
        return Err(PywsError::TemplateNotFound(template.to_path_buf()));
    }
    let package_dir = template.join(paths::TEMPLATE_PACKAGE_DIR);
    if !package_dir.is_dir() {
        return Err(PywsError::TemplateInvalid(
            paths::TEMPLATE_PACKAGE_DIR.to_string(),
        ));
    }
    if !package_dir.join(main_file()).is_file() {
        return Err(PywsError::TemplateInvalid(format!(
            "{}/{}",
            paths::TEMPLATE_PACKAGE_DIR,
            main_file()
        )));
    }
    Ok(())
}

fn write_builtin(target: &Path) -> Result<()> {
    for name in BuiltinTemplate::iter() {
        if let Some(file) = BuiltinTemplate::get(&name) {
            let dest = target.join(name.as_ref());
            if let Some(parent) = dest.parent() {
                io::ensure_dir(parent)?;
            }
            std::fs::write(&dest, file.data.as_ref())?;
        }
    }
    Ok(())
}

/// Copy `template` (or the built-in template when `None`) to the new
/// project's directory and rename the package and module.
pub fn create_project(req: &NewProject, template: Option<&Path>) -> Result<PathBuf> {
    paths::validate_project_name(&req.package)?;
    paths::validate_project_name(&req.module)?;

    let target = req.target();
    if target.exists() {
        return Err(PywsError::ProjectExists(target));
    }

    match template {
        Some(dir) => {
            check_template_dir(dir)?;
            tracing::info!(template = %dir.display(), target = %target.display(), "copying template");
            io::copy_dir_all(dir, &target)?;
        }
        None => {
            tracing::info!(target = %target.display(), "writing built-in template");
            write_builtin(&target)?;
        }
    }

    let src = target.join("src");
    let package_dir = src.join(&req.package);
    std::fs::rename(target.join(paths::TEMPLATE_PACKAGE_DIR), &package_dir)?;

    if req.module != paths::TEMPLATE_MAIN_MODULE {
        std::fs::rename(
            package_dir.join(main_file()),
            package_dir.join(format!("{}.py", req.module)),
        )?;
    }

    Ok(target)
}
