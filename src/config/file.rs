//! Configuration file loading and discovery.
//!
//! Pipeline configurations are YAML documents; JSON is accepted as the YAML
//! subset it is.

use super::defaults::CONFIG_FILE_NAMES;
use super::types::PipelineConfig;
use crate::error::{ApiCompatError, ErrorContext, Result};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir()
        && let Some(path) = find_config_in_dir(&cwd)
    {
        return Some(path);
    }

    find_git_root().and_then(|root| find_config_in_dir(&root))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

impl PipelineConfig {
    /// Parse a configuration document
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Serialize the configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Load a `PipelineConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ApiCompatError::io(path, e))?;
    PipelineConfig::from_yaml(&content)
        .with_context(|| format!("loading {}", path.display()))
}

/// Load the discovered config file, or the default configuration.
pub fn load_or_default(explicit_path: Option<&Path>) -> Result<(PipelineConfig, Option<PathBuf>)> {
    match discover_config_file(explicit_path) {
        Some(path) => {
            let config = load_config_file(&path)?;
            tracing::debug!(path = %path.display(), "Loaded pipeline configuration");
            Ok((config, Some(path)))
        }
        None => Ok((PipelineConfig::default(), None)),
    }
}

/// Example configuration file content.
pub fn generate_example_config() -> Result<String> {
    Ok(format!(
        "# api-compat pipeline configuration\n\
         # Place this file at .api-compat.yaml in your project root.\n\n{}",
        PipelineConfig::default().to_yaml()?
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IterationLimitPolicy;
    use crate::model::DifferenceSeverity;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".api-compat.yaml");
        std::fs::write(&config_path, "maxTransformIterations: 5\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let yaml = r#"
transforms:
  exclude: [noisy]
transformBlocks:
  - [rename, reclassify]
severityMapping:
  EQUIVALENT: allowed
  NON_BREAKING: allowed
  POTENTIALLY_BREAKING: documented
  BREAKING: error
onIterationLimit: fail
extensions:
  api-compat.differences:
    differences:
      - code: method.removed
        ignore: true
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.transform_blocks, vec![vec!["rename", "reclassify"]]);
        assert_eq!(
            config.severity_mapping[&DifferenceSeverity::NonBreaking],
            "allowed"
        );
        assert_eq!(config.on_iteration_limit, IterationLimitPolicy::Fail);
        assert!(config.extensions.contains_key("api-compat.differences"));
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ApiCompatError::Io { .. })));
    }

    #[test]
    fn test_malformed_yaml_is_a_config_error() {
        let result = PipelineConfig::from_yaml("maxTransformIterations: [");
        assert!(matches!(result, Err(ApiCompatError::Config(_))));
    }

    #[test]
    fn test_example_config_round_trips() {
        let example = generate_example_config().unwrap();
        assert!(example.contains("severityMapping"));
        assert_eq!(PipelineConfig::from_yaml(&example).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "{}\n").unwrap();

        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path));
    }
}
