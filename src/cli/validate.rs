//! Validate command handler.
//!
//! Resolves a pipeline configuration and lists every problem found.

use super::exit_codes;
use crate::config::{PipelineConfig, discover_config_file, load_config_file};
use crate::error::ApiCompatError;
use anyhow::{Result, bail};
use std::io::Write;
use std::path::Path;

/// Run the validate command, writing the outcome to `out`
pub fn run_validate(config_path: Option<&Path>, out: &mut impl Write) -> Result<i32> {
    let Some(path) = discover_config_file(config_path) else {
        match config_path {
            Some(explicit) => bail!("Config file not found: {}", explicit.display()),
            None => bail!("No config file found"),
        }
    };

    let config: PipelineConfig = load_config_file(&path)?;
    match config.resolve() {
        Ok(resolved) => {
            writeln!(
                out,
                "{}: valid ({} criticalities, {} transformation blocks, at most {} passes)",
                path.display(),
                resolved.criticalities.len(),
                resolved.transform_blocks.len(),
                resolved.limits.max_iterations
            )?;
            Ok(exit_codes::SUCCESS)
        }
        Err(ApiCompatError::InvalidConfig { errors }) => {
            writeln!(out, "{}: {} problem(s)", path.display(), errors.len())?;
            for error in &errors {
                writeln!(out, "  - {error}")?;
            }
            Ok(exit_codes::INVALID_CONFIG)
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn validate(yaml: &str) -> (i32, String) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("api-compat.yaml");
        std::fs::write(&path, yaml).unwrap();
        let mut out = Vec::new();
        let code = run_validate(Some(&path), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_valid_config() {
        let (code, out) = validate("maxTransformIterations: 10\n");
        assert_eq!(code, exit_codes::SUCCESS);
        assert!(out.contains("valid"));
        assert!(out.contains("at most 10 passes"));
    }

    #[test]
    fn test_invalid_config_lists_problems() {
        let (code, out) = validate(
            "maxTransformIterations: 0\nseverityMapping:\n  BREAKING: error\n",
        );
        assert_eq!(code, exit_codes::INVALID_CONFIG);
        assert!(out.contains("2 problem(s)"));
        assert!(out.contains("EQUIVALENT"));
        assert!(out.contains("maxTransformIterations"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut out = Vec::new();
        assert!(run_validate(Some(Path::new("/nonexistent/api-compat.yaml")), &mut out).is_err());
    }
}
