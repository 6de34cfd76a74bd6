// Analysis records extracted from Python source files
//
// These types are the unit of exchange between the parser, the dependency
// resolver, and the quality rules. They are serializable so downstream
// layers can persist or forward them without re-reading source.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Classification of an import statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// `import x` or `from x import y`
    Absolute,
    /// `from . import y` or `from ..x import y`
    Relative,
    /// `from x import *`
    Wildcard,
    /// Any clause carrying an `as` alias
    Aliased,
    /// Import lexically inside an `if` or `try` block
    Conditional,
}

/// Kind of construct a conditional import sits inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnclosingKind {
    If,
    Try,
}

/// One import clause with everything resolution and auditing need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatement {
    /// Source module; None for `from . import x` with only dots
    pub module: Option<String>,
    /// Imported names (the module itself for plain imports)
    pub names: Vec<String>,
    /// Original name -> alias, for `as` clauses
    pub aliases: BTreeMap<String, String>,
    /// Number of leading dots; 0 for absolute imports
    pub level: usize,
    pub kind: ImportKind,
    pub line: usize,
    pub col: usize,
    /// Statement text as written
    pub raw: String,
    pub is_future: bool,
    /// Set when the import is conditional
    pub enclosing: Option<EnclosingKind>,
}

impl ImportStatement {
    /// Names this import binds locally: imported names plus alias targets.
    /// The wildcard marker is kept out; wildcards bind unknowable names.
    pub fn bound_names(&self) -> BTreeSet<String> {
        let mut bound: BTreeSet<String> = self
            .names
            .iter()
            .filter(|n| n.as_str() != "*")
            .cloned()
            .collect();
        bound.extend(self.aliases.values().cloned());
        bound
    }

    /// Check for the `*` marker among imported names
    pub fn is_wildcard(&self) -> bool {
        self.names.iter().any(|n| n == "*")
    }

    /// Display label: the module if stated, otherwise the name list
    pub fn label(&self) -> String {
        match &self.module {
            Some(m) => m.clone(),
            None => self.names.join(", "),
        }
    }
}

/// A function or method definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub line: usize,
    /// Positional and keyword-only parameter names
    pub args: Vec<String>,
    /// Decorator expressions as written, without the `@`
    pub decorators: Vec<String>,
    pub is_async: bool,
    /// Assigned during class extraction by name+line match
    pub is_method: bool,
    pub docstring: Option<String>,
    /// Cyclomatic complexity, at least 1
    pub complexity: usize,
    /// Callee names: bare identifiers or attribute-access final components
    pub calls: Vec<String>,
}

/// A class definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub line: usize,
    /// Base classes by simple name or dotted path, as written
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    /// Names of functions defined directly in the class body
    pub methods: Vec<String>,
    pub docstring: Option<String>,
    pub is_dataclass: bool,
    /// Names assigned or annotated directly in the class body
    pub attributes: Vec<String>,
}

/// Per-file aggregate metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub docstring_lines: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub method_count: usize,
    pub import_count: usize,
    /// Sum of cyclomatic complexity across all functions in the file
    pub cyclomatic_complexity: usize,
    pub max_nesting_depth: usize,
    /// Code lines divided by function count, 0.0 with no functions
    pub avg_function_length: f64,
}

/// Complete analysis of a single Python file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Path relative to the repository root
    pub file_path: String,
    /// Dotted module name; None when the path is outside the root
    pub module_name: Option<String>,
    pub imports: Vec<ImportStatement>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub global_variables: Vec<String>,
    /// Resolved dependency file paths, relative to the root
    pub dependencies: BTreeSet<String>,
    pub metrics: CodeMetrics,
    /// Fatal problems: the analysis stopped early
    pub errors: Vec<String>,
    /// Non-fatal notices, e.g. wildcard imports or encoding fallback
    pub warnings: Vec<String>,
    /// Every identifier referenced in the file, including the base object
    /// of attribute accesses. Feeds the unused-import check.
    pub referenced_names: BTreeSet<String>,
    pub encoding: String,
    pub has_main_block: bool,
    pub shebang: Option<String>,
}

impl FileAnalysis {
    /// Create an empty analysis for a path
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            encoding: "utf-8".to_string(),
            ..Default::default()
        }
    }

    /// True when parsing failed and extraction did not run
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
