// Output module: rendered artifacts and the workspace they land in

pub mod diagrams;
pub mod report;

pub use diagrams::MermaidRenderer;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// What kind of text blob an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Diagram,
    Report,
    Data,
}

/// One rendered output, tagged with a stable id used as its filename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub kind: ArtifactKind,
    pub description: String,
    pub content: String,
}

impl Artifact {
    pub fn new(
        id: impl Into<String>,
        kind: ArtifactKind,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            content: content.into(),
        }
    }
}

/// Directory that receives artifacts. Writes are whole-file overwrites;
/// there is no append mode.
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open (creating if needed) a workspace directory
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an artifact, replacing any previous version
    pub fn save(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = self.root.join(&artifact.id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &artifact.content)?;
        info!("wrote {} ({})", path.display(), artifact.description);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_overwrite() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::open(dir.path()).unwrap();

        let first = Artifact::new("report.md", ArtifactKind::Report, "quality report", "v1");
        let path = workspace.save(&first).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "v1");

        let second = Artifact::new("report.md", ArtifactKind::Report, "quality report", "v2");
        workspace.save(&second).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep/workspace");
        let workspace = Workspace::open(&nested).unwrap();
        assert!(workspace.root().is_dir());
    }

    #[test]
    fn test_artifact_serializes() {
        let artifact = Artifact::new("map.mmd", ArtifactKind::Diagram, "architecture map", "graph TD");
        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"kind\":\"diagram\""));
    }
}
