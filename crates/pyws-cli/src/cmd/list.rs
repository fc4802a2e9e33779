use crate::context::Context;
use crate::output::{print_json, print_table, yes_no};
use pyws_core::workspace::{list_projects, list_sessions};

/// `pyws list`: projects under the workspace root, one per line so shell
/// completion functions can consume it directly.
pub fn run(ctx: &Context, prefix: Option<&str>, long: bool, json: bool) -> anyhow::Result<()> {
    let settings = &ctx.settings;

    if json {
        let sessions = list_sessions(settings, prefix)?;
        print_json(&sessions)?;
        return Ok(());
    }

    if long {
        let rows: Vec<Vec<String>> = list_sessions(settings, prefix)?
            .into_iter()
            .map(|s| {
                vec![
                    s.requested_name.unwrap_or_default(),
                    yes_no(s.has_isolated_environment),
                    yes_no(s.has_profile_directory),
                    s.resolved_directory.display().to_string(),
                ]
            })
            .collect();
        print_table(&["PROJECT", "ENV", "PROFILE", "PATH"], rows);
        return Ok(());
    }

    for name in list_projects(&settings.workspace_root, prefix)? {
        println!("{name}");
    }
    Ok(())
}
