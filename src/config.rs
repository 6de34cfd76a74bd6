use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub quality: QualityConfig,
    pub output: OutputConfig,
}

/// Analysis settings: what gets indexed and parsed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ignore patterns: substring matches against the full path, or
    /// suffix matches when the pattern starts with `*`
    pub ignore: Vec<String>,
    /// Files larger than this many bytes are skipped during indexing
    pub max_file_size: u64,
}

/// Thresholds for the quality rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Transitive dependents above this count flag a high-impact change
    pub high_impact: usize,
    /// Cyclomatic complexity above this flags a function
    pub complexity: usize,
    /// Nesting depth above this flags a file
    pub nesting: usize,
    /// Method count above this flags a god class
    pub methods_in_class: usize,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub format: OutputFormat,
}

/// Output format for the quality report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ignore: vec![
                "__pycache__".to_string(),
                ".git".to_string(),
                "venv".to_string(),
                "env".to_string(),
                ".venv".to_string(),
                "dist".to_string(),
                "build".to_string(),
                ".pytest_cache".to_string(),
                "coverage".to_string(),
                ".tox".to_string(),
                ".eggs".to_string(),
                "*.egg-info".to_string(),
            ],
            max_file_size: 10_000_000,
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            high_impact: 5,
            complexity: 10,
            nesting: 4,
            methods_in_class: 15,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./repolens-workspace"),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        ignore: Vec<String>,
        format: Option<String>,
    ) {
        if let Some(out) = output {
            self.output.directory = out;
        }

        if !ignore.is_empty() {
            self.analysis.ignore.extend(ignore);
        }

        if let Some(fmt) = format {
            self.output.format = match fmt.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Markdown,
            };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.analysis.max_file_size == 0 {
            return Err(Error::config_validation("max_file_size must be at least 1"));
        }

        if self.quality.complexity == 0 {
            return Err(Error::config_validation("complexity threshold must be at least 1"));
        }

        if self.quality.nesting == 0 {
            return Err(Error::config_validation("nesting threshold must be at least 1"));
        }

        if self.quality.methods_in_class == 0 {
            return Err(Error::config_validation(
                "methods_in_class threshold must be at least 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.quality.complexity, 10);
        assert_eq!(config.quality.nesting, 4);
        assert_eq!(config.quality.methods_in_class, 15);
        assert_eq!(config.quality.high_impact, 5);
        assert_eq!(config.analysis.max_file_size, 10_000_000);
        assert!(config.analysis.ignore.iter().any(|p| p == "__pycache__"));
        assert_eq!(config.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[analysis]
max_file_size = 500000

[quality]
complexity = 15
nesting = 6

[output]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.analysis.max_file_size, 500000);
        assert_eq!(config.quality.complexity, 15);
        assert_eq!(config.quality.nesting, 6);
        // Unspecified sections keep their defaults
        assert_eq!(config.quality.methods_in_class, 15);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_complexity() {
        let mut config = Config::default();
        config.quality.complexity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_file_size() {
        let mut config = Config::default();
        config.analysis.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_cli_output() {
        let mut config = Config::default();
        config.merge_cli(Some(PathBuf::from("/custom/output")), vec![], None);
        assert_eq!(config.output.directory, PathBuf::from("/custom/output"));
    }

    #[test]
    fn test_merge_cli_ignore() {
        let mut config = Config::default();
        let initial = config.analysis.ignore.len();
        config.merge_cli(None, vec!["node_modules".to_string()], None);
        assert_eq!(config.analysis.ignore.len(), initial + 1);
    }

    #[test]
    fn test_merge_cli_format() {
        let mut config = Config::default();
        config.merge_cli(None, vec![], Some("json".to_string()));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_output_format_parsing() {
        let toml_str = r#"format = "json""#;
        let output: OutputConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(output.format, OutputFormat::Json);
    }
}
