//! Dashboard Configuration
//! Optional `dashboard.json` next to the executable's working directory.

use crate::data::VolumePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Invalid config {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Immutable company name -> logo URL mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyLogos(BTreeMap<String, String>);

impl CompanyLogos {
    pub fn logo_for(&self, company: &str) -> Option<&str> {
        self.0.get(company).map(String::as_str)
    }

    pub fn companies(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

impl Default for CompanyLogos {
    fn default() -> Self {
        let logos = [
            (
                "Meta Platforms Inc.",
                "https://upload.wikimedia.org/wikipedia/commons/5/51/Facebook_f_logo_%282019%29.svg",
            ),
            (
                "Amazon Inc.",
                "https://upload.wikimedia.org/wikipedia/commons/a/a9/Amazon_logo.svg",
            ),
            (
                "Apple Inc.",
                "https://upload.wikimedia.org/wikipedia/commons/f/fa/Apple_logo_black.svg",
            ),
            (
                "Netflix Inc.",
                "https://upload.wikimedia.org/wikipedia/commons/0/08/Netflix_2015_logo.svg",
            ),
            (
                "Alphabet Inc.",
                "https://upload.wikimedia.org/wikipedia/commons/2/2f/Google_2015_logo.svg",
            ),
        ];
        Self(
            logos
                .into_iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV file loaded at startup
    pub data_path: PathBuf,
    pub title: String,
    /// env_logger filter used when RUST_LOG is unset
    pub log_level: String,
    pub volume_policy: VolumePolicy,
    /// Where exported chart images are written
    pub export_dir: PathBuf,
    pub window_size: [f32; 2],
    pub company_logos: CompanyLogos,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("MAANG_DATA.csv"),
            title: "Share Price Action Dashboard".to_string(),
            log_level: "info".to_string(),
            volume_policy: VolumePolicy::default(),
            export_dir: PathBuf::from("exports"),
            window_size: [1400.0, 900.0],
            company_logos: CompanyLogos::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Read `path` if it exists, otherwise use the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_logos() {
        let logos = CompanyLogos::default();
        assert_eq!(logos.companies().len(), 5);
        assert!(logos.logo_for("Apple Inc.").unwrap().ends_with("Apple_logo_black.svg"));
        assert_eq!(logos.logo_for("Unknown Corp."), None);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "data_path": "prices.csv", "volume_policy": "treat_as_zero" }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_path, PathBuf::from("prices.csv"));
        assert_eq!(config.volume_policy, VolumePolicy::TreatAsZero);
        assert_eq!(config.title, "Share Price Action Dashboard");
        assert_eq!(config.company_logos, CompanyLogos::default());
    }

    #[test]
    fn test_custom_logos_replace_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "company_logos": {{ "Acme": "https://example.com/acme.png" }} }}"#)
            .unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.company_logos.companies(), vec!["Acme"]);
    }

    #[test]
    fn test_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        file.flush().unwrap();

        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_, _)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = DashboardConfig::load_or_default(Path::new("/no/such/dashboard.json")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }
}
