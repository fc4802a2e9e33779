mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use pyws_core::config::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pyws",
    about = "Python workspace helper: launch IPython inside a project's environment, scaffold and maintain projects",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root holding one directory per project (default: ~/workspace)
    #[arg(long, global = true, env = "PYWS_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Config file (default: ~/.config/pyws/config.yaml)
    #[arg(long, global = true, env = "PYWS_CONFIG")]
    config: Option<PathBuf>,

    /// Interactive tool to launch (default: ipython)
    #[arg(long, global = true, env = "PYWS_TOOL")]
    tool: Option<String>,

    /// History file handed to the tool
    #[arg(long, global = true, env = "PYWS_HISTORY_FILE")]
    history_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the tool in a project's environment: `launch [name|.] [-- args...]`
    ///
    /// Without a name (or with `.`) the project is the nearest directory at
    /// or above the current one holding the manifest file. `--help` shows
    /// the tool's own help.
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Launch {
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "NAME|. [-- ARGS]"
        )]
        tokens: Vec<String>,
    },

    /// List projects in the workspace (completion candidates)
    List {
        /// Only names starting with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Show environment and profile columns
        #[arg(long, short = 'l')]
        long: bool,
    },

    /// Create a new project from the template
    New {
        /// Package name (lowercase Python identifier)
        package: String,

        /// Main module name (default: the package name)
        #[arg(long)]
        module: Option<String>,

        /// Parent directory (default: the workspace root)
        #[arg(long)]
        parent: Option<PathBuf>,

        /// Skip creating the project's environment
        #[arg(long)]
        no_venv: bool,

        /// Show the output of external commands
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Re-create a project's environment and install it in editable mode
    Venv {
        /// Project name or `.` (default: current project)
        target: Option<String>,

        /// Show the output of external commands
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Run the configured formatters in a project
    Format {
        /// Project name or `.` (default: current project)
        target: Option<String>,

        /// Show the output of external commands
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        workspace_root: cli.workspace,
        tool: cli.tool,
        history_file: cli.history_file,
    };

    let result = context::load(cli.config.as_deref(), overrides).and_then(|ctx| {
        match cli.command {
            Commands::Launch { tokens } => cmd::launch::run(&ctx, tokens),
            Commands::List { prefix, long } => {
                cmd::list::run(&ctx, prefix.as_deref(), long, cli.json).map(|()| 0)
            }
            Commands::New {
                package,
                module,
                parent,
                no_venv,
                verbose,
            } => cmd::new::run(
                &ctx,
                cmd::new::NewArgs {
                    package,
                    module,
                    parent,
                    venv: !no_venv,
                    verbose,
                },
                cli.json,
            )
            .map(|()| 0),
            Commands::Venv { target, verbose } => {
                cmd::venv::run(&ctx, target, verbose, cli.json).map(|()| 0)
            }
            Commands::Format { target, verbose } => {
                cmd::format::run(&ctx, target, verbose, cli.json).map(|()| 0)
            }
            Commands::Config { subcommand } => {
                cmd::config::run(&ctx, subcommand, cli.json).map(|()| 0)
            }
        }
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
