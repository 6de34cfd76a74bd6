// Forward and reverse dependency graphs, cycle and impact queries

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// File-level dependency graph. Both directions are kept in step so
/// reverse queries never rescan the forward map.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    forward: BTreeMap<String, BTreeSet<String>>,
    reverse: BTreeMap<String, BTreeSet<String>>,
}

/// Blast radius of a change to one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub file: String,
    /// Files that import this one
    pub direct_dependents: Vec<String>,
    /// Dependents of dependents, direct ones excluded
    pub transitive_dependents: Vec<String>,
    pub total_impact: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's outgoing edges. The node is created even with no
    /// dependencies; edges accumulate and are never removed within a run.
    pub fn add_dependencies(&mut self, file: &str, dependencies: &BTreeSet<String>) {
        let entry = self.forward.entry(file.to_string()).or_default();
        for dep in dependencies {
            entry.insert(dep.clone());
        }
        for dep in dependencies {
            self.reverse
                .entry(dep.clone())
                .or_default()
                .insert(file.to_string());
        }
    }

    /// Outgoing edges of a file, empty when unknown
    pub fn dependencies_of(&self, file: &str) -> BTreeSet<String> {
        self.forward.get(file).cloned().unwrap_or_default()
    }

    /// Incoming edges of a file, empty when unknown
    pub fn dependents_of(&self, file: &str) -> BTreeSet<String> {
        self.reverse.get(file).cloned().unwrap_or_default()
    }

    pub fn forward_edges(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.forward
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Find dependency cycles by DFS from every node in sorted order.
    ///
    /// A back-edge into the in-progress path yields that path from the
    /// repeated node through the current one, closed with the repeated
    /// node. Duplicates are removed by exact path equality; rotations of
    /// one cycle discovered from different roots may both appear.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = Vec::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();

        for node in self.forward.keys() {
            if visited.contains(node) {
                continue;
            }
            let mut path: Vec<String> = Vec::new();
            let mut in_progress: BTreeSet<String> = BTreeSet::new();
            self.dfs_cycles(node, &mut path, &mut in_progress, &mut visited, &mut cycles);
        }

        cycles
    }

    fn dfs_cycles(
        &self,
        node: &str,
        path: &mut Vec<String>,
        in_progress: &mut BTreeSet<String>,
        visited: &mut BTreeSet<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        if in_progress.contains(node) {
            if let Some(start) = path.iter().position(|p| p == node) {
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(node.to_string());
                if !cycles.contains(&cycle) {
                    cycles.push(cycle);
                }
            }
            return;
        }
        if visited.contains(node) {
            return;
        }

        visited.insert(node.to_string());
        in_progress.insert(node.to_string());
        path.push(node.to_string());

        if let Some(deps) = self.forward.get(node) {
            for dep in deps {
                self.dfs_cycles(dep, path, in_progress, visited, cycles);
            }
        }

        path.pop();
        in_progress.remove(node);
    }

    /// Who breaks when `file` changes: direct importers plus the closure
    /// over the reverse map. The file itself never appears in its own
    /// impact, even inside a cycle.
    pub fn impact(&self, file: &str) -> ImpactReport {
        let direct = self.dependents_of(file);

        let mut closure: BTreeSet<String> = BTreeSet::new();
        let mut worklist: Vec<String> = direct.iter().cloned().collect();
        while let Some(current) = worklist.pop() {
            if current == file {
                continue;
            }
            if !closure.insert(current.clone()) {
                continue;
            }
            for dependent in self.dependents_of(&current) {
                if !closure.contains(&dependent) {
                    worklist.push(dependent);
                }
            }
        }

        let transitive: Vec<String> = closure
            .iter()
            .filter(|f| !direct.contains(*f))
            .cloned()
            .collect();

        ImpactReport {
            file: file.to_string(),
            total_impact: closure.len(),
            direct_dependents: direct.into_iter().collect(),
            transitive_dependents: transitive,
        }
    }
}
