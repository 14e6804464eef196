mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::scoring::ScoreRequest;

/// Get the config directory path (~/.config/scale-score/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("scale-score"))
        .unwrap_or_else(|| PathBuf::from(".scale-score"))
}

/// Get the default scale library path (~/.config/scale-score/scales.yaml)
pub fn get_library_path() -> PathBuf {
    get_config_dir().join("scales.yaml")
}

/// Load the scale library from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to the library file. If None, uses the default
///   path (~/.config/scale-score/scales.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given library file does not exist
/// - The library file cannot be read
/// - The YAML cannot be parsed
///
/// A missing default library is not an error; it yields an empty library.
pub fn load_library(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let library_path = path.unwrap_or_else(get_library_path);

    if !library_path.exists() {
        if explicit {
            anyhow::bail!("Scale library not found at {}", library_path.display());
        }
        tracing::debug!("No scale library at {}, using an empty one", library_path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&library_path)
        .with_context(|| format!("Failed to read scale library at {}", library_path.display()))?;

    let config: Config = serde_saphyr::from_str(&content).with_context(|| {
        format!("Failed to parse scale library: invalid YAML in {}", library_path.display())
    })?;

    tracing::debug!("Loaded {} scales from {}", config.scales.len(), library_path.display());
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse a scoring request. YAML for `.yaml`/`.yml` paths, JSON otherwise.
pub fn parse_request(content: &str, path: Option<&Path>) -> Result<ScoreRequest> {
    if path.is_some_and(is_yaml) {
        serde_saphyr::from_str(content).context("Failed to parse request: invalid YAML")
    } else {
        serde_json::from_str(content).context("Failed to parse request: invalid JSON")
    }
}

/// Read a scoring request from a file, or from stdin when `source` is "-"
pub fn load_request(source: &str) -> Result<ScoreRequest> {
    if source == "-" {
        let mut content = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut content)
            .context("Failed to read request from stdin")?;
        return parse_request(&content, None);
    }

    let path = Path::new(source);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    parse_request(&content, Some(path))
        .with_context(|| format!("Invalid request in {}", path.display()))
}
