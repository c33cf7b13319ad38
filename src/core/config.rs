use crate::core::resolver::LookBack;
use crate::core::series::SeriesOrigin;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// How the annual workbook tier handles a year that fails to load.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnualFallback {
    /// Fill the failing years from the history workbook.
    #[default]
    PerYear,
    /// Any failing year fails the whole tier.
    AllOrNothing,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub html_path: String,
    pub table_id: String,
    /// `{year}` is replaced with the requested year.
    pub annual_path: String,
    pub history_path: String,
    pub timeout_secs: u64,
    pub annual_fallback: AnnualFallback,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: "https://www.bcra.gob.ar".to_string(),
            html_path: "/PublicacionesEstadisticas/Principales_variables_datos.asp".to_string(),
            table_id: "tbl_datos".to_string(),
            annual_path: "/Pdfs/PublicacionesEstadisticas/ICL_{year}.xls".to_string(),
            history_path: "/Pdfs/PublicacionesEstadisticas/diar_icl.xls".to_string(),
            timeout_secs: 30,
            annual_fallback: AnnualFallback::default(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn html_url(&self) -> String {
        format!("{}{}", self.base_url, self.html_path)
    }

    /// Annual workbook URL with the `{year}` placeholder left in place.
    pub fn annual_url_template(&self) -> String {
        format!("{}{}", self.base_url, self.annual_path)
    }

    pub fn history_url(&self) -> String {
        format!("{}{}", self.base_url, self.history_path)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 6 * 60 * 60,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Look-back applied by the resolver, per series origin. `None` means
/// unbounded.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    pub html_look_back_days: Option<u32>,
    pub workbook_look_back_days: Option<u32>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            html_look_back_days: None,
            workbook_look_back_days: Some(7),
        }
    }
}

impl LookupConfig {
    pub fn look_back_for(&self, origin: SeriesOrigin) -> LookBack {
        match origin {
            SeriesOrigin::HtmlTable => self.html_look_back_days.into(),
            SeriesOrigin::Workbook => self.workbook_look_back_days.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub lookup: LookupConfig,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults
    /// when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ar", "iclcalc", "iclcalc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.source.timeout(), Duration::from_secs(30));
        assert_eq!(config.cache.ttl(), Duration::from_secs(21_600));
        assert_eq!(config.source.annual_fallback, AnnualFallback::PerYear);
        assert_eq!(
            config.source.html_url(),
            "https://www.bcra.gob.ar/PublicacionesEstadisticas/Principales_variables_datos.asp"
        );
        assert_eq!(
            config.source.annual_url_template(),
            "https://www.bcra.gob.ar/Pdfs/PublicacionesEstadisticas/ICL_{year}.xls"
        );
        assert_eq!(
            config.lookup.look_back_for(SeriesOrigin::HtmlTable),
            LookBack::Unbounded
        );
        assert_eq!(
            config.lookup.look_back_for(SeriesOrigin::Workbook),
            LookBack::Days(7)
        );
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
source:
  base_url: "http://localhost:8080"
  annual_path: "/icl/{year}.xlsx"
  timeout_secs: 5
  annual_fallback: all_or_nothing
cache:
  ttl_secs: 60
lookup:
  html_look_back_days: 3
  workbook_look_back_days: null
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.source.base_url, "http://localhost:8080");
        assert_eq!(
            config.source.annual_url_template(),
            "http://localhost:8080/icl/{year}.xlsx"
        );
        // unspecified fields keep their defaults
        assert_eq!(config.source.table_id, "tbl_datos");
        assert_eq!(
            config.source.history_url(),
            "http://localhost:8080/Pdfs/PublicacionesEstadisticas/diar_icl.xls"
        );
        assert_eq!(config.source.timeout_secs, 5);
        assert_eq!(config.source.annual_fallback, AnnualFallback::AllOrNothing);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(
            config.lookup.look_back_for(SeriesOrigin::HtmlTable),
            LookBack::Days(3)
        );
        assert_eq!(
            config.lookup.look_back_for(SeriesOrigin::Workbook),
            LookBack::Unbounded
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.lookup, LookupConfig::default());
        assert_eq!(config.cache.ttl_secs, 21_600);
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "cache:\n  ttl_secs: 10\n").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.cache.ttl_secs, 10);

        let missing = AppConfig::load_from_path("/nonexistent/iclcalc.yaml");
        assert!(missing.is_err());
    }
}
