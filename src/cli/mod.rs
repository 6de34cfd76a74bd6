//! CLI module for repolens

mod args;

pub use args::{Args, Command};

use crate::analysis::{QualityAuditor, RepoAnalyzer};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::{report, Artifact, ArtifactKind, MermaidRenderer, Workspace};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<ExitCode> {
    match args.command {
        Command::Analyze {
            path,
            files,
            config,
            output,
            format,
            ignore,
            verbose,
        } => analyze(path, files, config, output, format, ignore, verbose),
        Command::Version => {
            println!("repolens {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn analyze(
    path: PathBuf,
    files: Vec<String>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    ignore: Vec<String>,
    verbose: bool,
) -> Result<ExitCode> {
    let mut cfg = match &config {
        Some(config_path) => Config::load(config_path)?,
        None => Config::load_or_default(Path::new("repolens.toml")),
    };
    cfg.merge_cli(output, ignore, Some(format));

    let output_dir = cfg.output.directory.clone();
    let output_format = cfg.output.format;

    let mut analyzer = RepoAnalyzer::new(&path, cfg.clone())?.with_verbose(verbose);

    let changed: Vec<String> = if files.is_empty() {
        analyzer.indexed_files()
    } else {
        files
    };

    if verbose {
        println!("Analyzing: {}", path.display());
        println!("Files: {}", changed.len());
        println!("Output: {}", output_dir.display());
    }

    // Full pass so repo-wide queries see every edge
    analyzer.dependency_graph(None)?;

    let auditor = QualityAuditor::new(cfg.quality.clone());
    let outcome = auditor.audit(&mut analyzer, &changed);

    let renderer = MermaidRenderer::new();
    let architecture = renderer.architecture_map(analyzer.graph());
    let heatmap = renderer.complexity_heatmap(analyzer.analyses());

    let workspace = Workspace::open(&output_dir)?;
    workspace.save(&Artifact::new(
        "architecture.mmd",
        ArtifactKind::Diagram,
        "architecture map",
        architecture,
    ))?;
    workspace.save(&Artifact::new(
        "complexity.mmd",
        ArtifactKind::Diagram,
        "complexity heatmap",
        heatmap,
    ))?;

    match output_format {
        OutputFormat::Markdown => {
            workspace.save(&Artifact::new(
                "report.md",
                ArtifactKind::Report,
                "quality report",
                report::render(&outcome, &changed),
            ))?;
        }
        OutputFormat::Json => {
            workspace.save(&Artifact::new(
                "report.json",
                ArtifactKind::Data,
                "quality report",
                serde_json::to_string_pretty(&outcome)?,
            ))?;
        }
    }

    let stats = analyzer.stats();
    println!(
        "Analyzed {} files ({} failed), {} issue(s) found",
        stats.analyzed,
        stats.failed,
        outcome.issues.len()
    );
    println!("Artifacts written to {}", workspace.root().display());

    if outcome.has_critical() {
        eprintln!("Critical issues found");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
