//! Engine configuration files.

use std::path::Path;

use anyhow::{Context, Result};
use futures_ta_core::engine::EngineConfig;

/// Read, parse and validate an [`EngineConfig`] TOML file.
///
/// Missing keys take their defaults, so an empty file is a valid config.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EngineConfig::from_toml_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_temp("");
        assert_eq!(load_config(file.path()).unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let file = write_temp("atr_stop_multiplier = 3.0\n\n[psar]\naf_max = 0.3\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.atr_stop_multiplier, 3.0);
        assert_eq!(config.psar.af_max, 0.3);
        assert_eq!(config.psar.af_start, 0.02);
        assert_eq!(config.min_rows_required, 60);
    }

    #[test]
    fn invalid_values_carry_the_path() {
        let file = write_temp("rsi_oversold = 80.0\n");
        let err = load_config(file.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid config"), "{message}");
        assert!(message.contains("rsi_oversold"), "{message}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(format!("{err}").contains("failed to read config"));
    }
}
