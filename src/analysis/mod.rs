// Analysis module: indexing, per-file analysis, and graph queries

pub mod graph;
pub mod imports;
pub mod index;
pub mod quality;

pub use graph::{DependencyGraph, ImpactReport};
pub use index::ModuleIndex;
pub use quality::{AuditOutcome, FileSummary, IssueKind, QualityAuditor, QualityIssue, Severity};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::{FileAnalysis, ImportStatement, PythonParser};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Counters kept across a run
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerStats {
    /// Files analyzed, including failed ones
    pub analyzed: usize,
    /// Files whose analysis recorded fatal errors
    pub failed: usize,
}

/// Main entry point: owns the index, the per-file cache, and the graph.
///
/// Analysis is lazy and cached by root-relative path. The dependency
/// graph accumulates edges as files are analyzed; the repo-wide queries
/// force a full pass first.
pub struct RepoAnalyzer {
    config: Config,
    root: PathBuf,
    index: ModuleIndex,
    parser: PythonParser,
    analyses: BTreeMap<String, FileAnalysis>,
    graph: DependencyGraph,
    graph_complete: bool,
    stats: AnalyzerStats,
    verbose: bool,
}

impl RepoAnalyzer {
    /// Create an analyzer rooted at `root`, indexing the tree immediately
    pub fn new(root: &Path, config: Config) -> Result<Self> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }
        let root = root.canonicalize()?;
        let index = ModuleIndex::build(&root, &config.analysis);
        let parser = PythonParser::new()?;

        Ok(Self {
            config,
            root,
            index,
            parser,
            analyses: BTreeMap::new(),
            graph: DependencyGraph::new(),
            graph_complete: false,
            stats: AnalyzerStats::default(),
            verbose: false,
        })
    }

    /// Enable progress output for bulk analysis
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &ModuleIndex {
        &self.index
    }

    pub fn stats(&self) -> AnalyzerStats {
        self.stats
    }

    /// Cached analyses keyed by root-relative path
    pub fn analyses(&self) -> &BTreeMap<String, FileAnalysis> {
        &self.analyses
    }

    /// All indexed file paths as relative strings, sorted
    pub fn indexed_files(&self) -> Vec<String> {
        self.index
            .files()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    /// Analyze one file, returning a complete record even on failure.
    ///
    /// A missing file, unreadable file, or syntax error lands in the
    /// record's `errors`; the call itself never fails on a bad file.
    pub fn analyze_file(&mut self, path: &str) -> Result<FileAnalysis> {
        let rel = self.relative_path(path);
        if let Some(cached) = self.analyses.get(&rel) {
            return Ok(cached.clone());
        }

        let mut analysis = FileAnalysis::new(rel.clone());
        let full = self.root.join(&rel);
        self.stats.analyzed += 1;

        if !full.exists() {
            analysis.errors.push(format!("File not found: {}", rel));
            self.stats.failed += 1;
            self.analyses.insert(rel, analysis.clone());
            return Ok(analysis);
        }

        let bytes = match std::fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) => {
                analysis.errors.push(format!("Analysis error: {}", e));
                self.stats.failed += 1;
                self.analyses.insert(rel, analysis.clone());
                return Ok(analysis);
            }
        };
        let (source, encoding, lossy) = decode_source(bytes);
        analysis.encoding = encoding.to_string();
        if lossy {
            analysis
                .warnings
                .push("File uses non-UTF-8 encoding".to_string());
        }

        analysis.module_name = ModuleIndex::module_name(Path::new(&rel));
        self.parser.extract(&source, &mut analysis);

        if analysis.has_errors() {
            self.stats.failed += 1;
        } else {
            self.resolve_dependencies(&mut analysis);
        }

        self.graph.add_dependencies(&rel, &analysis.dependencies);
        self.analyses.insert(rel, analysis.clone());
        Ok(analysis)
    }

    fn resolve_dependencies(&mut self, analysis: &mut FileAnalysis) {
        let module = analysis.module_name.clone();
        for import in &analysis.imports {
            if import.is_future {
                continue;
            }
            if let Some(dep) = imports::resolve(&self.index, import, module.as_deref()) {
                let dep = dep.to_string_lossy().into_owned();
                if dep != analysis.file_path {
                    analysis.dependencies.insert(dep);
                }
            } else {
                debug!(
                    "unresolved import {} in {}",
                    import.label(),
                    analysis.file_path
                );
            }
        }
    }

    /// Analyze the given files, or every indexed file when None, and
    /// return each file's sorted dependency list
    pub fn dependency_graph(
        &mut self,
        files: Option<&[String]>,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let targets: Vec<String> = match files {
            Some(files) => files.to_vec(),
            None => self.indexed_files(),
        };

        let progress = if self.verbose {
            let pb = ProgressBar::new(targets.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut result = BTreeMap::new();
        for target in targets {
            if let Some(pb) = &progress {
                pb.set_message(target.clone());
            }
            let analysis = self.analyze_file(&target)?;
            result.insert(
                analysis.file_path.clone(),
                analysis.dependencies.iter().cloned().collect(),
            );
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        if files.is_none() {
            self.graph_complete = true;
        }
        Ok(result)
    }

    fn ensure_full_graph(&mut self) -> Result<()> {
        if !self.graph_complete {
            self.dependency_graph(None)?;
        }
        Ok(())
    }

    /// The accumulated graph; call after a full `dependency_graph` pass
    /// for repo-wide coverage
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// All dependency cycles across the repository
    pub fn find_circular_dependencies(&mut self) -> Result<Vec<Vec<String>>> {
        self.ensure_full_graph()?;
        Ok(self.graph.find_cycles())
    }

    /// Blast radius of one file across the repository
    pub fn impact_of(&mut self, path: &str) -> Result<ImpactReport> {
        self.ensure_full_graph()?;
        let rel = self.relative_path(path);
        Ok(self.graph.impact(&rel))
    }

    /// Imports whose bound names are never referenced in the file.
    /// Wildcard imports bind unknowable names and are never flagged.
    pub fn find_unused_imports(&mut self, path: &str) -> Result<Vec<ImportStatement>> {
        let analysis = self.analyze_file(path)?;
        let mut unused = Vec::new();
        for import in &analysis.imports {
            if import.is_wildcard() {
                continue;
            }
            let bound = import.bound_names();
            if bound.is_empty() {
                continue;
            }
            if bound.iter().all(|n| !analysis.referenced_names.contains(n)) {
                unused.push(import.clone());
            }
        }
        Ok(unused)
    }

    /// Normalize to a root-relative string path
    fn relative_path(&self, path: &str) -> String {
        let p = Path::new(path);
        if p.is_absolute() {
            if let Ok(rel) = p.strip_prefix(&self.root) {
                return rel.to_string_lossy().into_owned();
            }
        }
        path.to_string()
    }
}

/// UTF-8 with a Latin-1 fallback; the fallback maps each byte to the
/// code point of the same value and flags the record
fn decode_source(bytes: Vec<u8>) -> (String, &'static str, bool) {
    match String::from_utf8(bytes) {
        Ok(source) => (source, "utf-8", false),
        Err(e) => {
            let source: String = e.into_bytes().iter().map(|&b| b as char).collect();
            (source, "latin-1", true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> (TempDir, RepoAnalyzer) {
        let dir = TempDir::new().unwrap();
        for (path, contents) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, contents).unwrap();
        }
        let analyzer = RepoAnalyzer::new(dir.path(), Config::default()).unwrap();
        (dir, analyzer)
    }

    #[test]
    fn test_missing_root_rejected() {
        let result = RepoAnalyzer::new(Path::new("/nonexistent/repo"), Config::default());
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_analyze_file_resolves_dependencies() {
        let (_dir, mut analyzer) = project(&[
            ("main.py", "import utils\nimport os\n\nutils.go()\n"),
            ("utils.py", "def go():\n    pass\n"),
        ]);
        let analysis = analyzer.analyze_file("main.py").unwrap();
        assert_eq!(analysis.module_name.as_deref(), Some("main"));
        assert!(analysis.dependencies.contains("utils.py"));
        // stdlib import stays unresolved, silently
        assert_eq!(analysis.dependencies.len(), 1);
    }

    #[test]
    fn test_missing_file_recorded_not_propagated() {
        let (_dir, mut analyzer) = project(&[("a.py", "")]);
        let analysis = analyzer.analyze_file("ghost.py").unwrap();
        assert_eq!(analysis.errors, vec!["File not found: ghost.py"]);
        assert_eq!(analyzer.stats().failed, 1);
    }

    #[test]
    fn test_unreadable_path_recorded_not_propagated() {
        let (dir, mut analyzer) = project(&[("a.py", "x = 1\n")]);
        fs::create_dir(dir.path().join("pkg")).unwrap();

        // Exists but cannot be read as a file
        let analysis = analyzer.analyze_file("pkg").unwrap();
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].starts_with("Analysis error:"));
        assert_eq!(analyzer.stats().failed, 1);
    }

    #[test]
    fn test_bulk_pass_survives_unreadable_entry() {
        let (dir, mut analyzer) = project(&[("a.py", "import b\n"), ("b.py", "")]);
        fs::create_dir(dir.path().join("broken.py.d")).unwrap();

        let targets = vec![
            "a.py".to_string(),
            "broken.py.d".to_string(),
            "b.py".to_string(),
        ];
        let graph = analyzer.dependency_graph(Some(&targets)).unwrap();

        // The unreadable entry did not abort the pass
        assert_eq!(graph["a.py"], vec!["b.py"]);
        assert!(graph.contains_key("b.py"));
        assert!(graph["broken.py.d"].is_empty());
        assert_eq!(analyzer.stats().failed, 1);
    }

    #[test]
    fn test_analysis_cached() {
        let (dir, mut analyzer) = project(&[("a.py", "x = 1\n")]);
        analyzer.analyze_file("a.py").unwrap();
        // content changes are not picked up within a run
        fs::write(dir.path().join("a.py"), "y = 2\n").unwrap();
        let again = analyzer.analyze_file("a.py").unwrap();
        assert_eq!(again.global_variables, vec!["x"]);
        assert_eq!(analyzer.stats().analyzed, 1);
    }

    #[test]
    fn test_absolute_path_normalized() {
        let (dir, mut analyzer) = project(&[("a.py", "")]);
        let abs = dir.path().canonicalize().unwrap().join("a.py");
        let analysis = analyzer.analyze_file(&abs.to_string_lossy()).unwrap();
        assert_eq!(analysis.file_path, "a.py");
    }

    #[test]
    fn test_latin1_fallback() {
        let (dir, mut analyzer) = project(&[("a.py", "")]);
        fs::write(dir.path().join("a.py"), b"# caf\xe9\nx = 1\n").unwrap();
        let analysis = analyzer.analyze_file("a.py").unwrap();
        assert_eq!(analysis.encoding, "latin-1");
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w.contains("non-UTF-8")));
        assert_eq!(analysis.global_variables, vec!["x"]);
    }

    #[test]
    fn test_dependency_graph_all_files() {
        let (_dir, mut analyzer) = project(&[
            ("a.py", "import b\n"),
            ("b.py", "import c\n"),
            ("c.py", ""),
        ]);
        let graph = analyzer.dependency_graph(None).unwrap();
        assert_eq!(graph["a.py"], vec!["b.py"]);
        assert_eq!(graph["b.py"], vec!["c.py"]);
        assert!(graph["c.py"].is_empty());
    }

    #[test]
    fn test_find_circular_dependencies() {
        let (_dir, mut analyzer) = project(&[("a.py", "import b\n"), ("b.py", "import a\n")]);
        let cycles = analyzer.find_circular_dependencies().unwrap();
        assert_eq!(cycles, vec![vec!["a.py", "b.py", "a.py"]]);
    }

    #[test]
    fn test_impact_forces_full_graph() {
        let (_dir, mut analyzer) = project(&[("a.py", "import b\n"), ("b.py", "")]);
        let impact = analyzer.impact_of("b.py").unwrap();
        assert_eq!(impact.direct_dependents, vec!["a.py"]);
        assert_eq!(impact.total_impact, 1);
    }

    #[test]
    fn test_unused_imports() {
        let src = "import os\nimport sys\n\nprint(sys.argv)\n";
        let (_dir, mut analyzer) = project(&[("a.py", src)]);
        let unused = analyzer.find_unused_imports("a.py").unwrap();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].module.as_deref(), Some("os"));
    }

    #[test]
    fn test_aliased_import_used_via_alias() {
        let src = "import numpy as np\n\nx = np.zeros(3)\n";
        let (_dir, mut analyzer) = project(&[("a.py", src)]);
        assert!(analyzer.find_unused_imports("a.py").unwrap().is_empty());
    }

    #[test]
    fn test_syntax_error_counts_as_failed() {
        let (_dir, mut analyzer) = project(&[("bad.py", "def broken(:\n")]);
        let analysis = analyzer.analyze_file("bad.py").unwrap();
        assert!(analysis.has_errors());
        assert!(analysis.dependencies.is_empty());
        assert_eq!(analyzer.stats().failed, 1);
    }
}
