//! Configuration loaders.
//!
//! Two files, both TOML:
//! - `regions.toml`: the region table (`[[region]]` entries) consumed by the
//!   rate estimator and the region map export.
//! - `seismon.toml`: service settings (catalog source, alert magnitude,
//!   degenerate-window policy, output directory, endpoint port).

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::rate::DegenerateWindowPolicy;
use crate::ingest::RegionSource;
use crate::model::{BoundingBox, CatalogError, ConfigError, Region};
use crate::regions::RegionCatalog;

/// Default location of the GEoREST induced seismicity database.
pub const DEFAULT_CATALOG_URL: &str = "https://digital.csic.es/bitstream/10261/284662/3/GEoREST_induced_seismicity_database_v20.11.2022.csv";

pub const DEFAULT_REGIONS_PATH: &str = "regions.toml";
pub const DEFAULT_CONFIG_PATH: &str = "seismon.toml";

// ============================================================================
// Region table (regions.toml)
// ============================================================================

/// One `[[region]]` entry as written in regions.toml
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub latitude_min: f64,
    pub latitude_max: f64,
    pub longitude_min: f64,
    pub longitude_max: f64,
    /// Path to a GeoJSON file describing the region boundary (map export only)
    pub geojson: Option<String>,
}

/// Root structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RegionRegistry {
    #[serde(default)]
    region: Vec<RegionConfig>,
}

impl TryFrom<&RegionConfig> for Region {
    type Error = CatalogError;

    fn try_from(config: &RegionConfig) -> Result<Self, Self::Error> {
        Region::new(
            config.name.clone(),
            BoundingBox {
                latitude_min: config.latitude_min,
                latitude_max: config.latitude_max,
                longitude_min: config.longitude_min,
                longitude_max: config.longitude_max,
            },
            config.geojson.clone(),
        )
    }
}

/// Parses regions.toml content. `origin` is only used in error messages.
pub fn parse_regions(contents: &str, origin: &str) -> Result<RegionCatalog, CatalogError> {
    let registry: RegionRegistry = toml::from_str(contents).map_err(|source| CatalogError::Parse {
        path: origin.to_string(),
        source,
    })?;

    let regions = registry
        .region
        .iter()
        .map(Region::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    RegionCatalog::new(regions)
}

/// Loads the region table from a TOML file.
pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<RegionCatalog, CatalogError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_regions(&contents, &path.display().to_string())
}

/// Loads regions from the default location (regions.toml)
pub fn load_regions_default() -> Result<RegionCatalog, CatalogError> {
    load_regions(DEFAULT_REGIONS_PATH)
}

/// `RegionSource` backed by a regions.toml file.
#[derive(Debug, Clone)]
pub struct RegionFile {
    path: PathBuf,
}

impl RegionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegionSource for RegionFile {
    fn load_regions(&self) -> Result<RegionCatalog, CatalogError> {
        load_regions(&self.path)
    }
}

// ============================================================================
// Service settings (seismon.toml)
// ============================================================================

/// Text encoding of the catalog file. The published GEoREST CSV is Latin-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Latin1,
    Utf8,
}

/// Where the event catalog comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub url: String,
    /// Local copy of the catalog; takes precedence over `url` when set
    pub path: Option<PathBuf>,
    pub encoding: Encoding,
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            path: None,
            encoding: Encoding::Latin1,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Events at or above this magnitude are reported as alerts
    pub alert_magnitude: f64,

    /// What a rate query returns when start == end and events matched
    pub degenerate_window: DegenerateWindowPolicy,

    /// Suggested heat radius (pixels) written into heatmap exports
    pub heat_radius: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alert_magnitude: 5.0,
            degenerate_window: DegenerateWindowPolicy::default(),
            heat_radius: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Root of seismon.toml. Every section and field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub endpoint: EndpointConfig,
}

impl AppConfig {
    /// Parses seismon.toml content. `origin` is only used in error messages.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents, &path.display().to_string())
    }

    /// Applies `SEISMON_DATA_URL` / `SEISMON_DATA_PATH` from the process
    /// environment (after loading `.env`).
    pub fn apply_env_overrides(&mut self) {
        dotenv::dotenv().ok();
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SEISMON_DATA_URL").filter(|v| !v.trim().is_empty()) {
            log::debug!("catalog URL overridden from environment");
            self.data.url = url;
        }
        if let Some(path) = lookup("SEISMON_DATA_PATH").filter(|v| !v.trim().is_empty()) {
            log::debug!("catalog path overridden from environment");
            self.data.path = Some(PathBuf::from(path));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_regions_succeeds() {
        let catalog = load_regions_default().expect("regions.toml should load");
        assert!(catalog.len() >= 2, "Should have at least 2 regions");
    }

    #[test]
    fn test_default_regions_match_reference_boxes() {
        let catalog = load_regions_default().expect("regions.toml should load");

        let a = catalog.get("Region A").expect("Region A should exist in config");
        assert_eq!(a.bounds.latitude_min, 0.0);
        assert_eq!(a.bounds.latitude_max, 10.0);
        assert_eq!(a.bounds.longitude_min, 0.0);
        assert_eq!(a.bounds.longitude_max, 10.0);
        assert_eq!(a.boundary_reference.as_deref(), Some("path/to/region_a.geojson"));

        let b = catalog.get("Region B").expect("Region B should exist in config");
        assert_eq!(b.bounds.latitude_min, 10.0);
        assert_eq!(b.bounds.longitude_max, 20.0);
    }

    #[test]
    fn test_all_regions_have_sane_bounds() {
        let catalog = load_regions_default().expect("regions.toml should load");
        for region in catalog.regions() {
            assert!(!region.name.is_empty(), "Name must not be empty");
            assert!(region.bounds.latitude_min >= -90.0 && region.bounds.latitude_max <= 90.0);
            assert!(region.bounds.longitude_min >= -180.0 && region.bounds.longitude_max <= 180.0);
        }
    }

    #[test]
    fn test_parse_regions_rejects_inverted_box() {
        let toml = r#"
[[region]]
name = "Upside down"
latitude_min = 20.0
latitude_max = 10.0
longitude_min = 0.0
longitude_max = 1.0
"#;
        let err = parse_regions(toml, "inline").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidBounds { .. }));
    }

    #[test]
    fn test_parse_regions_reports_malformed_toml() {
        let err = parse_regions("[[region]]\nname = ", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_parse_regions_without_geojson() {
        let toml = r#"
[[region]]
name = "Castor"
latitude_min = 40.0
latitude_max = 41.0
longitude_min = 0.0
longitude_max = 1.0
"#;
        let catalog = parse_regions(toml, "inline").expect("should parse");
        let castor = catalog.get("Castor").expect("Castor should be present");
        assert!(castor.boundary_reference.is_none());
    }

    #[test]
    fn test_region_file_source_reports_missing_file() {
        let source = RegionFile::new("does/not/exist.toml");
        let err = source.load_regions().unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data.url, DEFAULT_CATALOG_URL);
        assert_eq!(config.data.encoding, Encoding::Latin1);
        assert_eq!(config.analysis.alert_magnitude, 5.0);
        assert_eq!(config.analysis.degenerate_window, DegenerateWindowPolicy::CountAsOneDay);
        assert_eq!(config.endpoint.port, 8080);
    }

    #[test]
    fn test_app_config_partial_file_keeps_defaults() {
        let toml = r#"
[analysis]
alert_magnitude = 4.5
degenerate_window = "reject"

[data]
encoding = "utf8"
"#;
        let config = AppConfig::from_toml_str(toml, "inline").expect("should parse");
        assert_eq!(config.analysis.alert_magnitude, 4.5);
        assert_eq!(config.analysis.degenerate_window, DegenerateWindowPolicy::Reject);
        assert_eq!(config.analysis.heat_radius, 15);
        assert_eq!(config.data.encoding, Encoding::Utf8);
        assert_eq!(config.data.url, DEFAULT_CATALOG_URL);
        assert_eq!(config.output.directory, PathBuf::from("output"));
    }

    #[test]
    fn test_app_config_rejects_unknown_policy() {
        let toml = "[analysis]\ndegenerate_window = \"divide_by_zero\"\n";
        assert!(AppConfig::from_toml_str(toml, "inline").is_err());
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let config = AppConfig::load("definitely_missing_seismon.toml").expect("defaults");
        assert_eq!(config.endpoint.port, 8080);
    }

    #[test]
    fn test_overrides_replace_data_source() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SEISMON_DATA_URL", "https://example.org/catalog.csv"),
            ("SEISMON_DATA_PATH", "data/catalog.csv"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.data.url, "https://example.org/catalog.csv");
        assert_eq!(config.data.path, Some(PathBuf::from("data/catalog.csv")));
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.data.url, DEFAULT_CATALOG_URL);
        assert!(config.data.path.is_none());
    }
}
