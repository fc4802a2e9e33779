use anyhow::Context as _;
use pyws_core::config::{Config, Overrides, Settings};
use pyws_core::paths;
use std::path::{Path, PathBuf};

/// Effective settings for one invocation plus where they came from.
pub struct Context {
    pub config_path: PathBuf,
    pub home: PathBuf,
    pub settings: Settings,
}

/// Load settings.
///
/// Priority per field:
/// 1. CLI flag / its env var (passed in as `overrides`)
/// 2. Config file (`--config` / `PYWS_CONFIG`, else `~/.config/pyws/config.yaml`)
/// 3. Built-in defaults
pub fn load(explicit_config: Option<&Path>, overrides: Overrides) -> anyhow::Result<Context> {
    let home = paths::home_dir()?;
    let config_path = explicit_config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths::default_config_path(&home));

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let settings = config.resolve(&home, overrides);
    tracing::debug!(
        config = %config_path.display(),
        workspace = %settings.workspace_root.display(),
        "settings loaded"
    );

    Ok(Context {
        config_path,
        home,
        settings,
    })
}
