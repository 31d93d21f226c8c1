//! `ramify lower`: print the IR for one source file.

use super::resolve_config;
use crate::output::StyledOutput;
use crate::LoweringFlags;
use anyhow::Context;
use ramify_engine::Compiler;
use std::path::PathBuf;
use termcolor::ColorChoice;

pub struct LowerArgs {
    pub file: PathBuf,
    pub flags: LoweringFlags,
    pub no_module: bool,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub color: ColorChoice,
}

pub fn execute(args: LowerArgs) -> anyhow::Result<()> {
    let mut config = resolve_config(args.config.as_deref(), &args.file, &args.flags)?;
    if args.no_module {
        config.output.module_wrapper = false;
    }

    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let text = Compiler::new(config)
        .emit(&source)
        .with_context(|| format!("failed to lower {}", args.file.display()))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            StyledOutput::new(args.color).success(&format!(
                "{} -> {}",
                args.file.display(),
                path.display()
            ));
        }
        None => print!("{}", text),
    }
    Ok(())
}
