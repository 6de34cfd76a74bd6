// Python source extraction using tree-sitter
//
// One pass per concern, mirroring how the analysis record is consumed:
// imports, functions, classes, globals, main-guard, referenced names,
// then metrics. Extraction stops at the first syntax error.

use crate::error::{Error, Result};
use crate::parser::ast::*;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Extract imports, definitions, and metrics from source into `analysis`.
    ///
    /// Never fails: parse problems are recorded in `analysis.errors` and
    /// extraction stops there, leaving the structural lists empty.
    pub fn extract(&mut self, source: &str, analysis: &mut FileAnalysis) {
        if source.starts_with("#!") {
            analysis.shebang = source.lines().next().map(|l| l.to_string());
        }

        let tree = match self.parser.parse(source, None) {
            Some(tree) => tree,
            None => {
                analysis.errors.push("Failed to parse source".to_string());
                return;
            }
        };

        let root = tree.root_node();
        let bytes = source.as_bytes();

        if let Some(line) = first_syntax_error(&root) {
            analysis
                .errors
                .push(format!("Syntax error at line {}: invalid syntax", line));
            return;
        }

        extract_imports(&root, bytes, analysis);
        extract_functions(&root, bytes, analysis);
        extract_classes(&root, bytes, analysis);
        extract_globals(&root, bytes, analysis);
        analysis.has_main_block = detect_main_guard(&root, bytes);
        collect_references(&root, bytes, analysis);

        analysis.metrics.import_count = analysis.imports.len();
        analysis.metrics.function_count = analysis.functions.len();
        analysis.metrics.class_count = analysis.classes.len();
        analysis.metrics.method_count = analysis.functions.iter().filter(|f| f.is_method).count();
        analysis.metrics.cyclomatic_complexity =
            analysis.functions.iter().map(|f| f.complexity).sum();

        let mut max_depth = 0;
        nesting_depth(&root, 0, &mut max_depth);
        analysis.metrics.max_nesting_depth = max_depth;

        count_lines(source, &mut analysis.metrics);
        analysis.metrics.avg_function_length = if analysis.functions.is_empty() {
            0.0
        } else {
            analysis.metrics.code_lines as f64 / analysis.functions.len() as f64
        };
    }
}

/// Find the first ERROR or MISSING node, if any, returning its 1-based line
fn first_syntax_error(node: &Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(line) = first_syntax_error(&child) {
            return Some(line);
        }
    }
    None
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Imports

fn extract_imports(node: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    match node.kind() {
        "import_statement" => parse_plain_import(node, source, analysis),
        "import_from_statement" | "future_import_statement" => {
            parse_from_import(node, source, analysis)
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_imports(&child, source, analysis);
    }
}

/// `import x`, `import x as y`, `import a, b`: one entry per imported name
fn parse_plain_import(node: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    let line = node.start_position().row + 1;
    let col = node.start_position().column;
    let raw = node_text(node, source).to_string();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let name = node_text(&child, source).to_string();
                analysis.imports.push(ImportStatement {
                    module: Some(name.clone()),
                    names: vec![name],
                    aliases: Default::default(),
                    level: 0,
                    kind: ImportKind::Absolute,
                    line,
                    col,
                    raw: raw.clone(),
                    is_future: false,
                    enclosing: None,
                });
            }
            "aliased_import" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, source).to_string())
                    .unwrap_or_default();
                let alias = child
                    .child_by_field_name("alias")
                    .map(|n| node_text(&n, source).to_string());
                if name.is_empty() {
                    continue;
                }
                let mut aliases = std::collections::BTreeMap::new();
                if let Some(a) = alias {
                    aliases.insert(name.clone(), a);
                }
                let kind = if aliases.is_empty() {
                    ImportKind::Absolute
                } else {
                    ImportKind::Aliased
                };
                analysis.imports.push(ImportStatement {
                    module: Some(name.clone()),
                    names: vec![name],
                    aliases,
                    level: 0,
                    kind,
                    line,
                    col,
                    raw: raw.clone(),
                    is_future: false,
                    enclosing: None,
                });
            }
            _ => {}
        }
    }
}

/// `from x import y`, `from . import y`, `from __future__ import z`
fn parse_from_import(node: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    let line = node.start_position().row + 1;
    let col = node.start_position().column;
    let raw = node_text(node, source).to_string();

    let mut module: Option<String> = None;
    let mut names: Vec<String> = Vec::new();
    let mut aliases = std::collections::BTreeMap::new();
    let mut level = 0;
    let mut seen_import_keyword = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "relative_import" => {
                let mut inner = child.walk();
                for part in child.children(&mut inner) {
                    match part.kind() {
                        "import_prefix" => {
                            level = node_text(&part, source).chars().filter(|c| *c == '.').count();
                        }
                        "dotted_name" => {
                            module = Some(node_text(&part, source).to_string());
                        }
                        _ => {}
                    }
                }
            }
            "dotted_name" => {
                let text = node_text(&child, source).to_string();
                if seen_import_keyword {
                    names.push(text);
                } else {
                    module = Some(text);
                }
            }
            "__future__" => {
                module = Some("__future__".to_string());
            }
            "import" => {
                seen_import_keyword = true;
            }
            "wildcard_import" => {
                names.push("*".to_string());
            }
            "aliased_import" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, source).to_string())
                    .unwrap_or_default();
                let alias = child
                    .child_by_field_name("alias")
                    .map(|n| node_text(&n, source).to_string());
                if !name.is_empty() {
                    if let Some(a) = alias {
                        aliases.insert(name.clone(), a);
                    }
                    names.push(name);
                }
            }
            _ => {}
        }
    }

    let is_future = module.as_deref() == Some("__future__");
    let is_wildcard = names.iter().any(|n| n == "*");

    // Classification priority: relative > wildcard > aliased > absolute,
    // then conditional placement overrides everything
    let mut kind = if level > 0 {
        ImportKind::Relative
    } else if is_wildcard {
        ImportKind::Wildcard
    } else if !aliases.is_empty() {
        ImportKind::Aliased
    } else {
        ImportKind::Absolute
    };

    let enclosing = enclosing_conditional(node);
    if enclosing.is_some() {
        kind = ImportKind::Conditional;
    }

    if is_wildcard && !is_future {
        analysis
            .warnings
            .push(format!("Wildcard import at line {}: {}", line, raw));
    }

    analysis.imports.push(ImportStatement {
        module,
        names,
        aliases,
        level,
        kind,
        line,
        col,
        raw,
        is_future,
        enclosing,
    });
}

/// Conditional when the directly enclosing compound statement is an
/// `if`/`elif` arm or any part of a `try`. Imports nested under other
/// compounds (`for`, `while`, `with`, `def`) are not reclassified.
fn enclosing_conditional(node: &Node) -> Option<EnclosingKind> {
    let block = node.parent()?;
    if block.kind() != "block" {
        return None;
    }
    let owner = block.parent()?;
    match owner.kind() {
        "if_statement" | "elif_clause" => Some(EnclosingKind::If),
        "try_statement" | "except_clause" | "except_group_clause" | "finally_clause" => {
            Some(EnclosingKind::Try)
        }
        "else_clause" => match owner.parent()?.kind() {
            "if_statement" => Some(EnclosingKind::If),
            "try_statement" => Some(EnclosingKind::Try),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Functions

fn extract_functions(node: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    if node.kind() == "function_definition" {
        if let Some(func) = parse_function(node, source) {
            analysis.functions.push(func);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_functions(&child, source, analysis);
    }
}

fn parse_function(node: &Node, source: &[u8]) -> Option<FunctionInfo> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())?;
    let line = node.start_position().row + 1;

    let decorators = node
        .parent()
        .filter(|p| p.kind() == "decorated_definition")
        .map(|p| extract_decorators(&p, source))
        .unwrap_or_default();

    let mut args = Vec::new();
    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for child in params.children(&mut cursor) {
            match child.kind() {
                "identifier" => args.push(node_text(&child, source).to_string()),
                "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                    if let Some(param) = parameter_name(&child, source) {
                        args.push(param);
                    }
                }
                // *args / **kwargs containers are not recorded
                _ => {}
            }
        }
    }

    let is_async = {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|c| c.kind() == "async");
        found
    };

    let docstring = node
        .child_by_field_name("body")
        .and_then(|body| block_docstring(&body, source));

    let mut calls = Vec::new();
    collect_calls(node, source, &mut calls);

    Some(FunctionInfo {
        name,
        line,
        args,
        decorators,
        is_async,
        is_method: false,
        docstring,
        complexity: cyclomatic_complexity(node),
        calls,
    })
}

fn parameter_name(node: &Node, source: &[u8]) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(&name, source).to_string());
    }
    let mut cursor = node.walk();
    let name = node
        .children(&mut cursor)
        .find(|c| c.kind() == "identifier")
        .map(|n| node_text(&n, source).to_string());
    name
}

/// Decorator expressions as written, without the `@`
fn extract_decorators(node: &Node, source: &[u8]) -> Vec<String> {
    let mut decorators = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            let text = node_text(&child, source).trim_start_matches('@').trim();
            decorators.push(text.to_string());
        }
    }
    decorators
}

/// Callee names: bare identifiers or the final component of an attribute
fn collect_calls(node: &Node, source: &[u8], calls: &mut Vec<String>) {
    if node.kind() == "call" {
        if let Some(func) = node.child_by_field_name("function") {
            match func.kind() {
                "identifier" => calls.push(node_text(&func, source).to_string()),
                "attribute" => {
                    if let Some(attr) = func.child_by_field_name("attribute") {
                        calls.push(node_text(&attr, source).to_string());
                    }
                }
                _ => {}
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(&child, source, calls);
    }
}

/// Decision-point count over the whole function subtree, nested helpers
/// included. Boolean operators are binary nodes, so an n-operand chain
/// contributes n-1 as required.
fn cyclomatic_complexity(func: &Node) -> usize {
    let mut complexity = 1;
    count_decisions(func, &mut complexity);
    complexity
}

fn count_decisions(node: &Node, complexity: &mut usize) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "if_statement" | "elif_clause" | "while_statement" | "for_statement" => {
                *complexity += 1
            }
            "except_clause" | "except_group_clause" => *complexity += 1,
            "boolean_operator" => *complexity += 1,
            "for_in_clause" | "if_clause" => *complexity += 1,
            _ => {}
        }
        count_decisions(&child, complexity);
    }
}

// ---------------------------------------------------------------------------
// Classes

fn extract_classes(node: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    if node.kind() == "class_definition" {
        if let Some(class) = parse_class(node, source, analysis) {
            analysis.classes.push(class);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_classes(&child, source, analysis);
    }
}

fn parse_class(node: &Node, source: &[u8], analysis: &mut FileAnalysis) -> Option<ClassInfo> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())?;
    let line = node.start_position().row + 1;

    let decorators = node
        .parent()
        .filter(|p| p.kind() == "decorated_definition")
        .map(|p| extract_decorators(&p, source))
        .unwrap_or_default();
    let is_dataclass = decorators.iter().any(|d| d.contains("dataclass"));

    let mut bases = Vec::new();
    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for child in superclasses.children(&mut cursor) {
            match child.kind() {
                "identifier" | "attribute" => bases.push(node_text(&child, source).to_string()),
                _ => {}
            }
        }
    }

    let mut methods = Vec::new();
    let mut attributes = Vec::new();
    let mut docstring = None;

    if let Some(body) = node.child_by_field_name("body") {
        docstring = block_docstring(&body, source);

        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "function_definition" => {
                    mark_method(&child, source, analysis, &mut methods);
                }
                "decorated_definition" => {
                    if let Some(def) = child.child_by_field_name("definition") {
                        if def.kind() == "function_definition" {
                            mark_method(&def, source, analysis, &mut methods);
                        }
                    }
                }
                "expression_statement" => {
                    let mut inner = child.walk();
                    for stmt in child.children(&mut inner) {
                        if stmt.kind() == "assignment" {
                            assignment_targets(&stmt, source, &mut attributes);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Some(ClassInfo {
        name,
        line,
        bases,
        decorators,
        methods,
        docstring,
        is_dataclass,
        attributes,
    })
}

/// Record a method name and flip `is_method` on the matching FunctionInfo
fn mark_method(def: &Node, source: &[u8], analysis: &mut FileAnalysis, methods: &mut Vec<String>) {
    let name = match def.child_by_field_name("name") {
        Some(n) => node_text(&n, source).to_string(),
        None => return,
    };
    let line = def.start_position().row + 1;
    methods.push(name.clone());
    for func in &mut analysis.functions {
        if func.name == name && func.line == line {
            func.is_method = true;
        }
    }
}

/// Simple-name assignment targets, following chained assignments
fn assignment_targets(assign: &Node, source: &[u8], out: &mut Vec<String>) {
    if let Some(left) = assign.child_by_field_name("left") {
        if left.kind() == "identifier" {
            out.push(node_text(&left, source).to_string());
        }
    }
    if let Some(right) = assign.child_by_field_name("right") {
        if right.kind() == "assignment" {
            assignment_targets(&right, source, out);
        }
    }
}

/// Docstring of a block: a string as the first statement
fn block_docstring(block: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let mut inner = first.walk();
    for child in first.children(&mut inner) {
        if child.kind() == "string" {
            return Some(string_content(&child, source));
        }
    }
    None
}

/// Strip quotes from a string literal, handling triple quotes
fn string_content(node: &Node, source: &[u8]) -> String {
    let text = node_text(node, source);
    let s = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        &text[3..text.len().saturating_sub(3)]
    } else if text.starts_with('"') || text.starts_with('\'') {
        &text[1..text.len().saturating_sub(1)]
    } else {
        text
    };
    s.trim().to_string()
}

// ---------------------------------------------------------------------------
// Globals, main guard, references

/// Module-body plain or annotated assignments to simple names
fn extract_globals(root: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "expression_statement" {
            continue;
        }
        let mut inner = child.walk();
        for stmt in child.children(&mut inner) {
            if stmt.kind() == "assignment" {
                assignment_targets(&stmt, source, &mut analysis.global_variables);
            }
        }
    }
}

/// Find `if __name__ == "__main__":` anywhere, first match wins
fn detect_main_guard(node: &Node, source: &[u8]) -> bool {
    if matches!(node.kind(), "if_statement" | "elif_clause") {
        if let Some(condition) = node.child_by_field_name("condition") {
            if is_main_comparison(&condition, source) {
                return true;
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if detect_main_guard(&child, source) {
            return true;
        }
    }
    false
}

fn is_main_comparison(condition: &Node, source: &[u8]) -> bool {
    if condition.kind() != "comparison_operator" {
        return false;
    }
    let mut saw_name = false;
    let mut saw_eq = false;
    let mut saw_main = false;
    let mut cursor = condition.walk();
    for child in condition.children(&mut cursor) {
        match child.kind() {
            "identifier" if node_text(&child, source) == "__name__" => saw_name = true,
            "==" => saw_eq = true,
            "string" if node_text(&child, source).contains("__main__") => saw_main = true,
            _ => {}
        }
    }
    saw_name && saw_eq && saw_main
}

/// Gather every referenced identifier plus attribute base objects.
/// Import statements and definition names are excluded so an import is
/// only "used" through an actual reference.
fn collect_references(node: &Node, source: &[u8], analysis: &mut FileAnalysis) {
    match node.kind() {
        "import_statement" | "import_from_statement" | "future_import_statement" => return,
        "identifier" => {
            analysis
                .referenced_names
                .insert(node_text(node, source).to_string());
            return;
        }
        "attribute" => {
            if let Some(object) = node.child_by_field_name("object") {
                collect_references(&object, source, analysis);
            }
            return;
        }
        "function_definition" | "class_definition" => {
            let name_id = node.child_by_field_name("name").map(|n| n.id());
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if Some(child.id()) != name_id {
                    collect_references(&child, source, analysis);
                }
            }
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_references(&child, source, analysis);
    }
}

// ---------------------------------------------------------------------------
// Metrics

/// Structural nesting depth via DFS; `elif` arms add a level like the
/// nested conditionals they desugar to
fn nesting_depth(node: &Node, depth: usize, max_depth: &mut usize) {
    *max_depth = (*max_depth).max(depth);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "if_statement" | "elif_clause" | "for_statement" | "while_statement"
            | "with_statement" | "try_statement" => nesting_depth(&child, depth + 1, max_depth),
            _ => nesting_depth(&child, depth, max_depth),
        }
    }
}

/// Textual line bucketing. Triple-quote regions count as docstring lines,
/// entry and exit inclusive; a region opened and closed on one line is a
/// single docstring line. Mixed code/string lines can be mis-bucketed;
/// this is a deliberate approximation.
fn count_lines(source: &str, metrics: &mut CodeMetrics) {
    let mut code = 0;
    let mut comment = 0;
    let mut blank = 0;
    let mut docstring = 0;
    let mut total = 0;

    let mut in_region = false;
    let mut quote = "\"\"\"";

    for line in source.split('\n') {
        total += 1;
        let stripped = line.trim();

        if in_region {
            docstring += 1;
            if stripped.contains(quote) {
                in_region = false;
            }
            continue;
        }

        if stripped.contains("\"\"\"") || stripped.contains("'''") {
            quote = if stripped.contains("\"\"\"") { "\"\"\"" } else { "'''" };
            docstring += 1;
            if stripped.matches(quote).count() < 2 {
                in_region = true;
            }
            continue;
        }

        if stripped.is_empty() {
            blank += 1;
        } else if stripped.starts_with('#') {
            comment += 1;
        } else {
            code += 1;
        }
    }

    metrics.total_lines = total;
    metrics.code_lines = code;
    metrics.comment_lines = comment;
    metrics.blank_lines = blank;
    metrics.docstring_lines = docstring;
}
