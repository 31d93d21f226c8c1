//! Ramify command-line tool
//!
//! Lowers host function bodies to region IR and prints the result.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::ColorMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ramify")]
#[command(about = "Lower structured conditionals to region IR", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: nearest ramify.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Color output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

/// Flags shared by every lowering command
#[derive(clap::Args, Debug, Clone)]
pub struct LoweringFlags {
    /// Body drives begin_if/end_if itself instead of native `if` rewriting
    #[arg(long)]
    pub explicit: bool,

    /// Skip the structural verifier
    #[arg(long)]
    pub no_verify: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a source file and print the IR
    Lower {
        /// Input file
        file: PathBuf,
        #[command(flatten)]
        flags: LoweringFlags,
        /// Print functions without the enclosing `module { }`
        #[arg(long)]
        no_module: bool,
        /// Write IR to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lower source files and report errors without printing IR
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        flags: LoweringFlags,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let color = output::resolve_color_choice(cli.color);
    match cli.command {
        Commands::Lower {
            file,
            flags,
            no_module,
            output,
        } => commands::lower::execute(commands::lower::LowerArgs {
            file,
            flags,
            no_module,
            output,
            config: cli.config,
            color,
        }),
        Commands::Check { files, flags } => {
            commands::check::execute(files, flags, cli.config, color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_flag_is_validated() {
        let cli = Cli::try_parse_from(["ramify", "--color", "never", "check", "a.py"]).unwrap();
        assert_eq!(cli.color, ColorMode::Never);
        assert!(Cli::try_parse_from(["ramify", "--color", "alwys", "check", "a.py"]).is_err());
    }

    #[test]
    fn test_color_defaults_to_auto() {
        let cli = Cli::try_parse_from(["ramify", "lower", "a.py"]).unwrap();
        assert_eq!(cli.color, ColorMode::Auto);
    }
}
