use crate::context::Context;
use crate::output::{print_json, print_steps};
use anyhow::Context as _;
use pyws_core::maintenance::recreate_env;
use pyws_core::scaffold::{create_project, NewProject};
use std::path::PathBuf;

pub struct NewArgs {
    pub package: String,
    pub module: Option<String>,
    pub parent: Option<PathBuf>,
    pub venv: bool,
    pub verbose: bool,
}

/// `pyws new <package>`: copy the project template into the workspace.
pub fn run(ctx: &Context, args: NewArgs, json: bool) -> anyhow::Result<()> {
    let settings = &ctx.settings;
    let parent = args
        .parent
        .unwrap_or_else(|| settings.workspace_root.clone());

    let mut req = NewProject::new(&args.package, parent);
    if let Some(module) = args.module {
        req = req.with_module(module);
    }

    let target = create_project(&req, settings.template_dir.as_deref())?;

    let steps = if args.venv {
        recreate_env(&target, settings)
            .with_context(|| format!("project created at {} but its environment was not", target.display()))?
    } else {
        Vec::new()
    };

    if json {
        print_json(&serde_json::json!({
            "project": target,
            "package": req.package,
            "module": req.module,
            "steps": steps,
        }))?;
        return Ok(());
    }

    println!("Created {}", target.display());
    if !steps.is_empty() {
        println!("Environment:");
        print_steps(&steps, args.verbose);
    }
    println!("\nStart it with: pyws launch {}", req.package);
    Ok(())
}
