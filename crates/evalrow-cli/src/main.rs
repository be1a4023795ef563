use anyhow::Context;
use clap::Parser;
use evalrow_cli::logging::{filter_directive, init_logging};
use evalrow_cli::{EvalrowConfig, Report};
use std::path::PathBuf;

/// Regenerate the EvaluationRow JSON Schema, TypeScript declarations,
/// TypeScript helpers and README.
#[derive(Parser, Debug)]
#[command(name = "evalrow-schema", version, about)]
struct Cli {
    /// Output directory (overrides `[output] dir`)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Config file to use instead of ./evalrow.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compare with the files on disk instead of writing; exit 1 when stale
    #[arg(long)]
    check: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = EvalrowConfig::load(&cwd, cli.config.as_deref())?;
    if let Some(dir) = cli.out_dir {
        config.output.dir = Some(dir);
    }
    init_logging(filter_directive(config.log_level(), cli.verbose));
    for path in &config.sources {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    match evalrow_cli::run(&config, cli.check)? {
        Report::Written(paths) | Report::UpToDate(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            Ok(0)
        }
        Report::Stale(paths) => {
            for path in paths {
                eprintln!("stale: {}", path.display());
            }
            Ok(1)
        }
    }
}
