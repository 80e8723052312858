use anyhow::Result;
use clap::Parser;
use pyqual::cli::{Cli, Commands};
use pyqual::commands::{self, AnalyzeConfig, DocsConfig, FixConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Init { force } => commands::init_config(force),
        Commands::Analyze {
            paths,
            format,
            output,
            ignore,
            min_score,
        } => {
            let config = pyqual::load_config();
            let passed = commands::handle_analyze(
                AnalyzeConfig {
                    paths,
                    format,
                    output,
                    ignore,
                    min_score,
                },
                &config,
            )?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Fix {
            paths,
            dry_run,
            ignore,
        } => commands::handle_fix(
            FixConfig {
                paths,
                dry_run,
                ignore,
            },
            &pyqual::load_config(),
        ),
        Commands::Docs {
            paths,
            generate,
            style,
            format,
        } => commands::handle_docs(
            DocsConfig {
                paths,
                generate,
                style: style.map(Into::into),
                format,
            },
            &pyqual::load_config(),
        ),
    }
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step from warn.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pyqual={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
