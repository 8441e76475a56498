//! Handlers for `hirematch config {path,get,init,export}`.

use std::path::{Path, PathBuf};

use hirematch_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::HirematchConfig;

/// Handle a config subcommand.
///
/// Receives the raw `--config` path rather than a loaded config because
/// `path` and `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = HirematchConfig::resolve_config_path(config_path).ok_or_else(|| {
                Error::config("Could not determine config directory for this platform")
            })?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; run `hirematch config init` to create it)");
            }
            Ok(())
        }
        ConfigAction::Get { key } => {
            let config = HirematchConfig::load(config_path)?;
            println!("{}", lookup(&config, &key)?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => HirematchConfig::default_config_path()
                    .ok_or_else(|| Error::config("Could not determine config directory"))?,
            };
            write_default_config(&path, force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            let config = HirematchConfig::load(config_path)?;
            for line in export_lines(&config, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Display form of the value at a dotted key.
fn lookup(config: &HirematchConfig, key: &str) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    let mut current = &value;
    for part in key.split('.') {
        current = current
            .as_table()
            .and_then(|t| t.get(part))
            .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
    }

    Ok(match current {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) | toml::Value::Array(_) => {
            toml::to_string_pretty(current).map_err(|e| Error::config(e.to_string()))?
        }
        other => other.to_string(),
    })
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = HirematchConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))
}

fn export_lines(config: &HirematchConfig, docker_env: bool) -> Result<Vec<String>> {
    let vars = config.to_env_vars()?;
    Ok(vars
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_values() {
        let config = HirematchConfig::default();
        assert_eq!(lookup(&config, "project_name").unwrap(), "hirematch");
        assert_eq!(lookup(&config, "search.default_k").unwrap(), "25");
        assert_eq!(lookup(&config, "reranker.max_length").unwrap(), "512");
        assert!(lookup(&config, "search").unwrap().contains("default_top_m = 10"));
    }

    #[test]
    fn test_lookup_missing_key() {
        let err = lookup(&HirematchConfig::default(), "search.nonexistent").unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(lookup(&HirematchConfig::default(), "project_name.deeper").is_err());
    }

    #[test]
    fn test_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hirematch").join("config.toml");

        write_default_config(&path, false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[embedding]"));
        assert!(content.contains("[search]"));
    }

    #[test]
    fn test_init_respects_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old").unwrap();

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        write_default_config(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("project_name"));
    }

    #[test]
    fn test_export_formats() {
        let config = HirematchConfig::default();
        let plain = export_lines(&config, false).unwrap();
        assert!(plain.contains(&"HIREMATCH_SEARCH_DEFAULT_TOP_M=10".to_string()));

        let docker = export_lines(&config, true).unwrap();
        assert!(docker.iter().all(|l| l.starts_with("--env HIREMATCH_")));
    }

    #[test]
    fn test_handle_get_with_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndefault_k = 40\n").unwrap();

        let result = handle_config_command(
            Some(path.to_str().unwrap()),
            ConfigAction::Get {
                key: "search.default_k".into(),
            },
        );
        assert!(result.is_ok());
        assert!(
            handle_config_command(
                Some(path.to_str().unwrap()),
                ConfigAction::Get { key: "nope".into() },
            )
            .is_err()
        );
    }

    #[test]
    fn test_handle_path() {
        assert!(handle_config_command(Some("/explicit/config.toml"), ConfigAction::Path).is_ok());
    }
}
