// Import-to-file resolution against the module index

use crate::analysis::index::ModuleIndex;
use crate::parser::ast::ImportStatement;
use std::path::PathBuf;

/// Resolve an import to the repository file it refers to, if any.
///
/// Relative imports are anchored at `current_module`; a dot level that
/// climbs past the top of the module path cannot resolve. Unresolved
/// imports (stdlib, third-party, bad levels) return None, never an error.
pub fn resolve(
    index: &ModuleIndex,
    import: &ImportStatement,
    current_module: Option<&str>,
) -> Option<PathBuf> {
    let target = if import.level > 0 {
        let current = current_module?;
        let segments: Vec<&str> = current.split('.').collect();
        if import.level > segments.len() {
            return None;
        }
        let base = segments[..segments.len() - import.level].join(".");
        match (&import.module, base.is_empty()) {
            (Some(module), true) => module.clone(),
            (Some(module), false) => format!("{}.{}", base, module),
            (None, true) => return lookup_names(index, "", import),
            (None, false) => base,
        }
    } else {
        import.module.clone()?
    };

    if let Some(path) = index.lookup(&target) {
        return Some(path.to_path_buf());
    }
    if let Some(path) = index.lookup(&format!("{}.__init__", target)) {
        return Some(path.to_path_buf());
    }
    lookup_names(index, &target, import)
}

/// `from pkg import name` where `name` is itself a submodule
fn lookup_names(index: &ModuleIndex, base: &str, import: &ImportStatement) -> Option<PathBuf> {
    for name in &import.names {
        if name == "*" {
            continue;
        }
        let candidate = if base.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", base, name)
        };
        if let Some(path) = index.lookup(&candidate) {
            return Some(path.to_path_buf());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::parser::ast::ImportKind;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn index(files: &[&str]) -> (TempDir, ModuleIndex) {
        let dir = TempDir::new().unwrap();
        for path in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, "").unwrap();
        }
        let idx = ModuleIndex::build(dir.path(), &AnalysisConfig::default());
        (dir, idx)
    }

    fn import(module: Option<&str>, names: &[&str], level: usize) -> ImportStatement {
        ImportStatement {
            module: module.map(|m| m.to_string()),
            names: names.iter().map(|s| s.to_string()).collect(),
            aliases: Default::default(),
            level,
            kind: if level > 0 {
                ImportKind::Relative
            } else {
                ImportKind::Absolute
            },
            line: 1,
            col: 0,
            raw: String::new(),
            is_future: false,
            enclosing: None,
        }
    }

    #[test]
    fn test_absolute_exact_match() {
        let (_dir, idx) = index(&["utils.py"]);
        let imp = import(Some("utils"), &["utils"], 0);
        assert_eq!(resolve(&idx, &imp, Some("main")), Some(PathBuf::from("utils.py")));
    }

    #[test]
    fn test_absolute_package_init() {
        let (_dir, idx) = index(&["pkg/__init__.py"]);
        let imp = import(Some("pkg"), &["pkg"], 0);
        assert_eq!(
            resolve(&idx, &imp, None),
            Some(PathBuf::from("pkg/__init__.py"))
        );
    }

    #[test]
    fn test_from_import_submodule() {
        let (_dir, idx) = index(&["pkg/__init__.py", "pkg/helpers.py"]);
        // from pkg import helpers resolves to the submodule only when pkg
        // itself is absent... pkg/__init__.py matches first here
        let imp = import(Some("pkg.helpers"), &["helpers"], 0);
        assert_eq!(
            resolve(&idx, &imp, None),
            Some(PathBuf::from("pkg/helpers.py"))
        );
    }

    #[test]
    fn test_per_name_fallback() {
        let (_dir, idx) = index(&["pkg/helpers.py"]);
        // no pkg/__init__.py, so `from pkg import helpers` falls through
        // to the per-name lookup
        let imp = import(Some("pkg"), &["helpers"], 0);
        assert_eq!(
            resolve(&idx, &imp, None),
            Some(PathBuf::from("pkg/helpers.py"))
        );
    }

    #[test]
    fn test_relative_package_init_wins() {
        let (_dir, idx) = index(&["pkg/__init__.py", "pkg/a.py", "pkg/b.py"]);
        // in pkg.a: from . import b resolves to the package itself first
        let imp = import(None, &["b"], 1);
        assert_eq!(
            resolve(&idx, &imp, Some("pkg.a")),
            Some(PathBuf::from("pkg/__init__.py"))
        );
    }

    #[test]
    fn test_relative_sibling_without_init() {
        let (_dir, idx) = index(&["pkg/a.py", "pkg/b.py"]);
        let imp = import(None, &["b"], 1);
        assert_eq!(
            resolve(&idx, &imp, Some("pkg.a")),
            Some(PathBuf::from("pkg/b.py"))
        );
    }

    #[test]
    fn test_relative_with_module() {
        let (_dir, idx) = index(&["pkg/sub/__init__.py", "pkg/utils.py"]);
        // in pkg.sub.thing: from ..utils import helper
        let imp = import(Some("utils"), &["helper"], 2);
        assert_eq!(
            resolve(&idx, &imp, Some("pkg.sub.thing")),
            Some(PathBuf::from("pkg/utils.py"))
        );
    }

    #[test]
    fn test_root_level_dot_import() {
        let (_dir, idx) = index(&["a.py", "b.py"]);
        // in top-level a: from . import b has an empty base and no module;
        // the per-name lookup still finds the root sibling
        let imp = import(None, &["b"], 1);
        assert_eq!(
            resolve(&idx, &imp, Some("a")),
            Some(PathBuf::from("b.py"))
        );
    }

    #[test]
    fn test_relative_level_overflow() {
        let (_dir, idx) = index(&["a.py", "b.py"]);
        // `from ... import x` in a top-level module climbs too far
        let imp = import(None, &["b"], 3);
        assert_eq!(resolve(&idx, &imp, Some("a")), None);
    }

    #[test]
    fn test_relative_without_current_module() {
        let (_dir, idx) = index(&["a.py"]);
        let imp = import(None, &["a"], 1);
        assert_eq!(resolve(&idx, &imp, None), None);
    }

    #[test]
    fn test_external_unresolved() {
        let (_dir, idx) = index(&["main.py"]);
        let imp = import(Some("os"), &["os"], 0);
        assert_eq!(resolve(&idx, &imp, Some("main")), None);
    }

    #[test]
    fn test_wildcard_names_skipped_in_fallback() {
        let (_dir, idx) = index(&["pkg/real.py"]);
        let imp = import(Some("pkg"), &["*"], 0);
        assert_eq!(resolve(&idx, &imp, None), None);
    }

    #[test]
    fn test_resolve_missing_module_field() {
        let (_dir, idx) = index(&["a.py"]);
        let imp = import(None, &["a"], 0);
        assert_eq!(resolve(&idx, &imp, Some("main")), None);
    }
}
