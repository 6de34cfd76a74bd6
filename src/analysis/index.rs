// Repository indexer: maps dotted module names to Python files

use crate::config::AnalysisConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Index of every Python module under a repository root.
///
/// Keys are dotted module names; a package `__init__.py` is registered
/// under both `pkg.__init__` and `pkg`. Paths are relative to the root.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: BTreeMap<String, PathBuf>,
    packages: BTreeSet<String>,
    files: BTreeSet<PathBuf>,
    total_files: usize,
}

impl ModuleIndex {
    /// Walk `root` and index every `.py` file that passes the filters.
    /// Indexing is best-effort: unreadable or oversized files are skipped
    /// with a log line, never an error.
    pub fn build(root: &Path, config: &AnalysisConfig) -> Self {
        let mut index = Self::default();

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            !is_ignored(&rel.to_string_lossy(), &config.ignore)
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > config.max_file_size => {
                    warn!(
                        "skipping {} ({} bytes exceeds max_file_size)",
                        entry.path().display(),
                        meta.len()
                    );
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            }

            let rel = match entry.path().strip_prefix(root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => entry.path().to_path_buf(),
            };
            index.register(rel);
        }

        info!(
            "indexed {} Python files across {} packages",
            index.total_files,
            index.packages.len()
        );
        index
    }

    fn register(&mut self, rel: PathBuf) {
        let dotted = match dotted_path(&rel) {
            Some(d) => d,
            None => return,
        };

        self.total_files += 1;
        self.modules.insert(dotted.clone(), rel.clone());
        if let Some(pkg) = dotted.strip_suffix(".__init__") {
            self.modules.insert(pkg.to_string(), rel.clone());
        }

        // Every ancestor segment is a package prefix
        if let Some(name) = Self::module_name(&rel) {
            let segments: Vec<&str> = name.split('.').collect();
            for end in 1..segments.len() {
                self.packages.insert(segments[..end].join("."));
            }
        }

        self.files.insert(rel);
    }

    /// Dotted module name for a root-relative path, trailing `__init__`
    /// dropped. None for `__init__.py` at the root itself.
    pub fn module_name(rel: &Path) -> Option<String> {
        let dotted = dotted_path(rel)?;
        let mut segments: Vec<&str> = dotted.split('.').collect();
        if segments.last() == Some(&"__init__") {
            segments.pop();
        }
        if segments.is_empty() {
            return None;
        }
        Some(segments.join("."))
    }

    /// Look up the file backing a dotted module name
    pub fn lookup(&self, module: &str) -> Option<&Path> {
        self.modules.get(module).map(|p| p.as_path())
    }

    /// All indexed file paths, relative to the root, sorted
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|p| p.as_path())
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }
}

/// Path with `/` turned into `.` and the `.py` suffix removed
fn dotted_path(rel: &Path) -> Option<String> {
    let mut segments: Vec<String> = Vec::new();
    for component in rel.components() {
        segments.push(component.as_os_str().to_string_lossy().into_owned());
    }
    let last = segments.pop()?;
    let stem = last.strip_suffix(".py")?;
    if stem.is_empty() {
        return None;
    }
    segments.push(stem.to_string());
    Some(segments.join("."))
}

/// Substring match on the path, or suffix match for `*`-prefixed patterns
fn is_ignored(path: &str, patterns: &[String]) -> bool {
    if path.is_empty() {
        return false;
    }
    patterns.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            path.ends_with(suffix)
        } else {
            path.contains(pattern.as_str())
        }
    })
}
