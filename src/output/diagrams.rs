// Mermaid diagram rendering
//
// Pure string projection over analysis results; nothing here touches
// the filesystem.

use crate::analysis::DependencyGraph;
use crate::parser::FileAnalysis;
use std::collections::{BTreeMap, BTreeSet};

const SAFE_COMPLEXITY: usize = 10;
const DANGER_COMPLEXITY: usize = 20;

/// Renders the architecture map and the complexity heatmap
pub struct MermaidRenderer {
    /// Layout direction (TD, LR, BT, RL)
    direction: String,
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self {
            direction: "TD".to_string(),
        }
    }

    pub fn with_direction(mut self, dir: &str) -> Self {
        self.direction = dir.to_string();
        self
    }

    /// Dependency map grouped into per-directory sections with a legend.
    /// An empty graph renders as an empty string.
    pub fn architecture_map(&self, graph: &DependencyGraph) -> String {
        if graph.is_empty() {
            return String::new();
        }

        let mut lines = Vec::new();
        lines.push(format!("graph {}", self.direction));
        lines.push("    classDef core fill:#e8f4f8,stroke:#2980b9,stroke-width:2px".to_string());
        lines.push("    classDef utils fill:#eafaf1,stroke:#27ae60,stroke-width:2px".to_string());
        lines.push("    classDef tests fill:#fef9e7,stroke:#f39c12,stroke-width:2px".to_string());
        lines.push("    classDef other fill:#f4f6f7,stroke:#7f8c8d,stroke-width:2px".to_string());
        lines.push(String::new());
        lines.push("    subgraph Legend".to_string());
        lines.push("        L1[Core modules]:::core".to_string());
        lines.push("        L2[Utilities]:::utils".to_string());
        lines.push("        L3[Tests]:::tests".to_string());
        lines.push("        L4[Other]:::other".to_string());
        lines.push("    end".to_string());

        // Every node seen on either side of an edge, grouped by section
        let mut nodes: BTreeSet<&str> = BTreeSet::new();
        for (file, deps) in graph.forward_edges() {
            nodes.insert(file.as_str());
            for dep in deps {
                nodes.insert(dep.as_str());
            }
        }

        let mut sections: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for &node in &nodes {
            sections.entry(section_of(node)).or_default().push(node);
        }

        for (section, files) in &sections {
            lines.push(String::new());
            lines.push(format!("    subgraph {}", clean_id(section)));
            for file in files {
                lines.push(format!(
                    "        {}[{}]:::{}",
                    clean_id(file),
                    short_name(file),
                    section_style(section)
                ));
            }
            lines.push("    end".to_string());
        }

        lines.push(String::new());
        for (file, deps) in graph.forward_edges() {
            for dep in deps {
                lines.push(format!("    {} --> {}", clean_id(file), clean_id(dep)));
            }
        }

        lines.join("\n")
    }

    /// One node per file, colored by its summed cyclomatic complexity.
    /// Empty input renders as an empty string.
    pub fn complexity_heatmap(&self, analyses: &BTreeMap<String, FileAnalysis>) -> String {
        if analyses.is_empty() {
            return String::new();
        }

        let mut lines = Vec::new();
        lines.push(format!("graph {}", self.direction));
        lines.push("    classDef safe fill:#eafaf1,stroke:#27ae60,stroke-width:2px".to_string());
        lines
            .push("    classDef warning fill:#fef9e7,stroke:#f39c12,stroke-width:2px".to_string());
        lines.push("    classDef danger fill:#fdedec,stroke:#c0392b,stroke-width:2px".to_string());
        lines.push(String::new());
        lines.push("    subgraph Legend".to_string());
        lines.push(format!(
            "        S[CC under {}]:::safe",
            SAFE_COMPLEXITY
        ));
        lines.push(format!(
            "        W[CC {} to {}]:::warning",
            SAFE_COMPLEXITY,
            DANGER_COMPLEXITY - 1
        ));
        lines.push(format!(
            "        D[CC {} and above]:::danger",
            DANGER_COMPLEXITY
        ));
        lines.push("    end".to_string());
        lines.push(String::new());

        for (path, analysis) in analyses {
            let cc = analysis.metrics.cyclomatic_complexity;
            lines.push(format!(
                "    {}[\"{} (CC: {})\"]:::{}",
                clean_id(path),
                path,
                cc,
                complexity_band(cc)
            ));
        }

        lines.join("\n")
    }
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn complexity_band(cc: usize) -> &'static str {
    if cc >= DANGER_COMPLEXITY {
        "danger"
    } else if cc >= SAFE_COMPLEXITY {
        "warning"
    } else {
        "safe"
    }
}

/// Top-level directory of a path, or "root" for bare files
fn section_of(path: &str) -> String {
    match path.split('/').next() {
        Some(first) if first != path => first.to_string(),
        _ => "root".to_string(),
    }
}

fn section_style(section: &str) -> &'static str {
    if section == "root" {
        "core"
    } else if section.contains("test") {
        "tests"
    } else if section.contains("util") {
        "utils"
    } else {
        "other"
    }
}

fn short_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Mermaid-safe node id: every non-alphanumeric byte becomes `_`
fn clean_id(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
