use crate::context::Context;
use anyhow::Context as _;
use pyws_core::launcher;
use pyws_core::resolve::{find_project_root, Invocation, Session, Target, ARG_SEPARATOR};
use std::ffi::OsString;

/// clap swallows a `--` that directly follows `launch`. Put it back when the
/// raw argument right before the collected tokens is that separator, so
/// `pyws launch -- -i x` still targets the current project.
fn restore_leading_separator(argv: &[OsString], mut tokens: Vec<String>) -> Vec<String> {
    let before = argv
        .len()
        .checked_sub(tokens.len() + 1)
        .map(|i| argv[i].as_os_str());
    if before.is_some_and(|arg| arg == ARG_SEPARATOR) {
        tokens.insert(0, ARG_SEPARATOR.to_string());
    }
    tokens
}

/// `pyws launch [name|.] [--] [args...]`: start the tool in a project's
/// environment and hand back its exit code.
pub fn run(ctx: &Context, tokens: Vec<String>) -> anyhow::Result<i32> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let tokens = restore_leading_separator(&argv, tokens);
    let invocation = Invocation::parse(&tokens);
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let settings = &ctx.settings;

    if invocation.target == Target::Help {
        let project = find_project_root(&cwd, &settings.manifest).ok();
        let plan = launcher::plan_help(project.as_deref(), settings)?;
        return Ok(plan.run()?);
    }

    let session = Session::open(&invocation.target, &cwd, settings)?;
    tracing::info!(
        dir = %session.resolved_directory.display(),
        env = session.has_isolated_environment,
        profile = session.has_profile_directory,
        "resolved project"
    );

    let plan = launcher::plan_launch(&session, settings, &invocation.passthrough)?;

    // The terminal delivers Ctrl-C to the whole foreground group. The tool
    // decides what an interrupt means; we only wait for it.
    ctrlc::set_handler(|| tracing::debug!("interrupt left to the tool"))
        .context("failed to install interrupt handler")?;

    Ok(plan.run()?)
}
