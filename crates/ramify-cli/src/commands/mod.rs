//! Subcommand implementations.

pub mod check;
pub mod lower;

use crate::LoweringFlags;
use anyhow::Context;
use ramify_engine::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load the config named on the command line, else the nearest
/// `ramify.toml` above `near`, else defaults. Flags override file values.
pub fn resolve_config(
    explicit: Option<&Path>,
    near: &Path,
    flags: &LoweringFlags,
) -> anyhow::Result<Config> {
    let start = near
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let path = explicit.map(Path::to_path_buf).or_else(|| Config::discover(&start));

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Config::from_file(&path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if flags.explicit {
        config.lowering.rewrite_ast = false;
    }
    if flags.no_verify {
        config.lowering.verify = false;
    }
    Ok(config)
}
