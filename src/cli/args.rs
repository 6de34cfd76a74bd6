//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Static analysis and dependency graphs for Python codebases
#[derive(Parser, Debug)]
#[command(name = "repolens")]
#[command(about = "Static analysis and dependency graphs for Python codebases")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a repository and write diagrams plus a quality report
    Analyze {
        /// Path to the repository root
        path: PathBuf,

        /// Changed files to audit, relative to the root (defaults to all)
        #[arg(long)]
        files: Vec<String>,

        /// Config file path (defaults to repolens.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (markdown, json)
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Extra ignore patterns (can be repeated)
        #[arg(long)]
        ignore: Vec<String>,

        /// Verbose output with a progress bar
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let args = Args::try_parse_from(["repolens", "analyze", "./repo"]).unwrap();
        match args.command {
            Command::Analyze {
                path,
                files,
                format,
                output,
                verbose,
                ..
            } => {
                assert_eq!(path, PathBuf::from("./repo"));
                assert!(files.is_empty());
                assert_eq!(format, "markdown");
                assert!(output.is_none());
                assert!(!verbose);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_with_files() {
        let args = Args::try_parse_from([
            "repolens", "analyze", ".", "--files", "a.py", "--files", "b.py", "--format", "json",
        ])
        .unwrap();
        match args.command {
            Command::Analyze { files, format, .. } => {
                assert_eq!(files, vec!["a.py", "b.py"]);
                assert_eq!(format, "json");
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_version_subcommand() {
        let args = Args::try_parse_from(["repolens", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }

    #[test]
    fn test_missing_path_rejected() {
        assert!(Args::try_parse_from(["repolens", "analyze"]).is_err());
    }
}
