use ditter_core::ProcessingParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "DITTER_CONFIG";

/// Whether jobs may use the GPU engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuMode {
    /// Probe once and use the GPU for eligible plans when one is found.
    #[default]
    Auto,
    /// Never touch the GPU.
    Off,
}

/// Application configuration loaded from a YAML file.
///
/// ```yaml
/// gpu: off
/// defaults:
///   palette: gameboy
///   extras:
///     serpentine: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gpu: GpuMode,

    /// Parameters used when a command gives none.
    pub defaults: ProcessingParams,
}

impl AppConfig {
    /// Resolve the config file: explicit path first, then `DITTER_CONFIG`.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Load the config, falling back to defaults on any failure.
    pub fn load(explicit: Option<&Path>) -> Self {
        match Self::locate(explicit) {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file given, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), gpu = ?config.gpu, "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn gpu_enabled(&self) -> bool {
        self.gpu == GpuMode::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditter_core::{AlgorithmSelector, Category, PaletteSpec};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
gpu: off
defaults:
  algorithm:
    type: builtin
    category: ordered
    id: bayer-8x8
  palette: gameboy
  extras:
    seed: 9
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.gpu, GpuMode::Off);
        assert!(!config.gpu_enabled());
        assert_eq!(
            config.defaults.algorithm,
            AlgorithmSelector::builtin(Category::Ordered, "bayer-8x8")
        );
        assert_eq!(
            config.defaults.palette,
            Some(PaletteSpec::Named("gameboy".into()))
        );
        assert_eq!(config.defaults.extras.seed, 9);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.gpu_enabled());
    }

    #[test]
    fn test_unknown_params_field_rejected() {
        let yaml = "defaults:\n  colour: red\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bad_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gpu: [not, a, mode]").unwrap();
        assert_eq!(AppConfig::load_from_file(file.path()), AppConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file(Path::new("/nonexistent/ditter.yaml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("job.yaml");
        assert_eq!(AppConfig::locate(Some(path)), Some(PathBuf::from("job.yaml")));
    }
}
