pub mod config;
pub mod format;
pub mod launch;
pub mod list;
pub mod new;
pub mod venv;

use crate::context::Context;
use anyhow::Context as _;
use pyws_core::resolve::{Invocation, Session};

/// Resolve `[name|.]` the same way `launch` does, for the maintenance tasks.
pub(crate) fn open_project(ctx: &Context, target: Option<String>) -> anyhow::Result<Session> {
    let tokens: Vec<String> = target.into_iter().collect();
    let invocation = Invocation::parse(&tokens);
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let session = Session::open(&invocation.target, &cwd, &ctx.settings)?;
    Ok(session)
}
