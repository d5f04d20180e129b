//! Config and schema command handlers.

use super::exit_codes;
use crate::config::{
    CONFIG_FILE_NAMES, discover_config_file, generate_example_config, generate_json_schema,
    load_or_default,
};
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Print the JSON schema of the configuration format, or write it to `output`
pub fn run_schema(output: Option<PathBuf>, out: &mut impl Write) -> Result<i32> {
    let schema = generate_json_schema()?;
    match output {
        Some(path) => {
            std::fs::write(&path, &schema)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Schema written to {}", path.display());
        }
        None => writeln!(out, "{schema}")?,
    }
    Ok(exit_codes::SUCCESS)
}

/// Print the effective configuration
pub fn run_config_show(config_path: Option<&Path>, out: &mut impl Write) -> Result<i32> {
    let (config, loaded_from) = load_or_default(config_path)?;
    match &loaded_from {
        Some(path) => writeln!(out, "# Loaded from: {}", path.display())?,
        None => writeln!(out, "# No config file found; showing defaults")?,
    }
    write!(out, "{}", config.to_yaml()?)?;
    Ok(exit_codes::SUCCESS)
}

/// Print the recognized file names and the discovered config file
pub fn run_config_path(config_path: Option<&Path>, out: &mut impl Write) -> Result<i32> {
    writeln!(out, "Recognized file names (current directory, then git root):")?;
    for name in CONFIG_FILE_NAMES {
        writeln!(out, "  {name}")?;
    }
    match discover_config_file(config_path) {
        Some(path) => writeln!(out, "Active config file: {}", path.display())?,
        None => writeln!(out, "No config file found.")?,
    }
    Ok(exit_codes::SUCCESS)
}

/// Write an example configuration into `dir`
pub fn run_config_init(dir: &Path) -> Result<i32> {
    let target = dir.join(CONFIG_FILE_NAMES[0]);
    if target.exists() {
        bail!("{} already exists", target.display());
    }
    std::fs::write(&target, generate_example_config()?)
        .with_context(|| format!("failed to write {}", target.display()))?;
    tracing::info!("Created {}", target.display());
    Ok(exit_codes::SUCCESS)
}
