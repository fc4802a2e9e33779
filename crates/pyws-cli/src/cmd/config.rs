use crate::context::Context;
use crate::output::print_json;
use anyhow::Context as _;
use clap::Subcommand;
use pyws_core::config::{Config, WarnLevel};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective settings and any validation warnings
    Show,

    /// Write a config file with the defaults spelled out
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Context, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx, json),
        ConfigSubcommand::Init { force } => init(ctx, force, json),
        ConfigSubcommand::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let warnings = ctx.settings.validate();

    if json {
        print_json(&serde_json::json!({
            "config_path": ctx.config_path,
            "settings": ctx.settings,
            "warnings": warnings,
        }))?;
    } else {
        println!("# {}", ctx.config_path.display());
        print!("{}", serde_yaml::to_string(&ctx.settings)?);
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            eprintln!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(ctx: &Context, force: bool, json: bool) -> anyhow::Result<()> {
    let path = &ctx.config_path;
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::starter(&ctx.home)
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "config_path": path }))?;
    } else {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
