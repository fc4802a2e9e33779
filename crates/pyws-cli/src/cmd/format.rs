use super::open_project;
use crate::context::Context;
use crate::output::{print_json, print_steps};
use pyws_core::maintenance::run_formatters;

/// `pyws format [name|.]`: run the configured formatters in the project.
pub fn run(ctx: &Context, target: Option<String>, verbose: bool, json: bool) -> anyhow::Result<()> {
    let session = open_project(ctx, target)?;
    let dir = &session.resolved_directory;
    if !json {
        println!("Project: {}", dir.display());
    }

    let steps = run_formatters(dir, &ctx.settings)?;

    if json {
        print_json(&serde_json::json!({ "project": dir, "steps": steps }))?;
    } else if steps.is_empty() {
        println!("No formatters configured.");
    } else {
        print_steps(&steps, verbose);
    }
    Ok(())
}
