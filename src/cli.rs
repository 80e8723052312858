use crate::docstring::DocStyle;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable report (default)
    Terminal,
    /// Serialized analysis values
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Google,
    Numpy,
    Rest,
}

impl From<StyleArg> for DocStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Google => DocStyle::Google,
            StyleArg::Numpy => DocStyle::Numpy,
            StyleArg::Rest => DocStyle::Rest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pyqual")]
#[command(about = "Python code quality analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute metrics and review findings for files or directories
    Analyze {
        /// Files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Glob patterns to skip
        #[arg(long = "ignore", value_delimiter = ',')]
        ignore: Vec<String>,

        /// Exit with status 1 when any file grades below this score
        #[arg(long = "min-score")]
        min_score: Option<f64>,
    },

    /// Apply automatic fixes to Python files
    Fix {
        /// Files or directories to fix
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print what would change without writing files
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Glob patterns to skip
        #[arg(long = "ignore", value_delimiter = ',')]
        ignore: Vec<String>,
    },

    /// Report docstring coverage and draft missing docstrings
    Docs {
        /// Files or directories to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print a generated docstring for every undocumented declaration
        #[arg(long)]
        generate: bool,

        /// Docstring convention for generated text (defaults to config)
        #[arg(long, value_enum)]
        style: Option<StyleArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Write a default .pyqual.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_analyze_command() {
        let cli = Cli::parse_from([
            "pyqual",
            "analyze",
            "src",
            "lib.py",
            "--format",
            "json",
            "--min-score",
            "75",
            "-vv",
        ]);

        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Analyze {
                paths,
                format,
                min_score,
                ..
            } => {
                assert_eq!(paths, vec![PathBuf::from("src"), PathBuf::from("lib.py")]);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(min_score, Some(75.0));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parsing_fix_command() {
        let cli = Cli::parse_from(["pyqual", "fix", "app.py", "--dry-run"]);
        match cli.command {
            Commands::Fix { paths, dry_run, .. } => {
                assert_eq!(paths, vec![PathBuf::from("app.py")]);
                assert!(dry_run);
            }
            _ => panic!("Expected Fix command"),
        }
    }

    #[test]
    fn test_cli_parsing_docs_command() {
        let cli = Cli::parse_from(["pyqual", "docs", ".", "--generate", "--style", "numpy"]);
        match cli.command {
            Commands::Docs {
                generate, style, ..
            } => {
                assert!(generate);
                assert_eq!(style.map(DocStyle::from), Some(DocStyle::Numpy));
            }
            _ => panic!("Expected Docs command"),
        }
    }

    #[test]
    fn test_cli_parsing_init_command() {
        let cli = Cli::parse_from(["pyqual", "init", "--force"]);
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }
}
