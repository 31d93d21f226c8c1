//! `ramify check`: lower files and report errors without printing IR.

use super::resolve_config;
use crate::output::StyledOutput;
use crate::LoweringFlags;
use ramify_engine::Compiler;
use std::path::PathBuf;
use termcolor::ColorChoice;

pub fn execute(
    files: Vec<PathBuf>,
    flags: LoweringFlags,
    config: Option<PathBuf>,
    color: ColorChoice,
) -> anyhow::Result<()> {
    let mut out = StyledOutput::new(color);
    let mut failed = 0usize;

    for file in &files {
        let result = resolve_config(config.as_deref(), file, &flags).and_then(|config| {
            let source = std::fs::read_to_string(file)?;
            Ok(Compiler::new(config).compile(&source)?)
        });
        match result {
            Ok(module) => out.success(&format!(
                "{} ({} function(s))",
                file.display(),
                module.function_count()
            )),
            Err(err) => {
                failed += 1;
                out.error(&format!("{}: {:#}", file.display(), err));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed", failed, files.len());
    }
    Ok(())
}
