//! Catalog configuration.
//!
//! Settings come from three layers, later layers overriding earlier ones:
//! stock defaults, an optional `courseware.toml` in the lesson directory,
//! and command-line flags. The merged [`CatalogConfig`] is then resolved
//! against the lesson directory into a [`Settings`] value, which is built
//! once and passed by reference to every stage.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Gomoku"                     # Catalog title (default: catalog id)
//! catalog_id = "coursedetail.C0002"    # Default: lesson directory name
//! protection_id = "bad985e3..."        # Default: derived from catalog id
//! vip_threshold = 5                    # Lessons numbered >= this are VIP
//! sentinel = "encrypt"                 # Replacement content of VIP lessons
//! output = "../coursedetail.C0002.json" # Default: <catalog_id>.json beside the directory
//!
//! [tutorial]
//! host = "doc.itprojects.cn"
//! api_version = "v1.1"
//!
//! [entry]
//! video = ""
//! question_answer = ""
//! product_detail = ""
//! ```
//!
//! Unknown keys are rejected to catch typos early. Relative `output` paths
//! are resolved against the lesson directory.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the lesson directory.
pub const CONFIG_FILENAME: &str = "courseware.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Catalog configuration as written in `courseware.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Catalog display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Folder identifier used in tutorial URLs and the output filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    /// Identifier inserted into backup filenames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection_id: Option<String>,
    /// Lessons whose ordinal is at or above this are VIP.
    pub vip_threshold: u64,
    /// Marker line that replaces the content of protected lessons.
    pub sentinel: String,
    /// Where the catalog JSON is written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub tutorial: TutorialConfig,
    pub entry: EntryDefaults,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            title: None,
            catalog_id: None,
            protection_id: None,
            vip_threshold: 5,
            sentinel: "encrypt".to_string(),
            output: None,
            tutorial: TutorialConfig::default(),
            entry: EntryDefaults::default(),
        }
    }
}

/// Where tutorial links point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TutorialConfig {
    pub host: String,
    pub api_version: String,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            host: "doc.itprojects.cn".to_string(),
            api_version: "v1.1".to_string(),
        }
    }
}

impl TutorialConfig {
    /// `https://<host>/api/<version>/course/<catalog_id>/<filename>`
    pub fn url(&self, catalog_id: &str, filename: &str) -> String {
        format!(
            "https://{}/api/{}/course/{}/{}",
            self.host, self.api_version, catalog_id, filename
        )
    }
}

/// Fixed fields copied into every catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntryDefaults {
    pub video: String,
    pub question_answer: String,
    pub product_detail: String,
}

/// Values given on the command line. `None` leaves the config value as is.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub catalog_id: Option<String>,
    pub protection_id: Option<String>,
    pub vip_threshold: Option<u64>,
    pub output: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if overrides.title.is_some() {
            self.title = overrides.title;
        }
        if overrides.catalog_id.is_some() {
            self.catalog_id = overrides.catalog_id;
        }
        if overrides.protection_id.is_some() {
            self.protection_id = overrides.protection_id;
        }
        if let Some(threshold) = overrides.vip_threshold {
            self.vip_threshold = threshold;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
    }

    /// Fill in derived defaults and validate.
    pub fn resolve(self, lesson_dir: &Path) -> Result<Settings, ConfigError> {
        let catalog_id = match self.catalog_id {
            Some(id) => id,
            None => directory_name(lesson_dir)?,
        };
        let protection_id = self
            .protection_id
            .unwrap_or_else(|| derive_protection_id(&catalog_id));
        let title = self.title.unwrap_or_else(|| catalog_id.clone());
        let output = match self.output {
            Some(path) if path.is_relative() => lesson_dir.join(path),
            Some(path) => path,
            None => default_output_dir(lesson_dir).join(format!("{catalog_id}.json")),
        };

        let settings = Settings {
            title,
            catalog_id,
            protection_id,
            vip_threshold: self.vip_threshold,
            sentinel: self.sentinel,
            output,
            tutorial: self.tutorial,
            entry: self.entry,
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn directory_name(dir: &Path) -> Result<String, ConfigError> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .join(dir)
    };
    let normalized: PathBuf = absolute.components().collect();
    normalized
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| *n != "..")
        .map(str::to_string)
        .ok_or_else(|| {
            ConfigError::Validation(format!(
                "cannot derive catalog_id from {}; set it explicitly",
                dir.display()
            ))
        })
}

fn default_output_dir(lesson_dir: &Path) -> PathBuf {
    lesson_dir.join("..")
}

/// First 32 hex digits of SHA-256 over the catalog id.
pub fn derive_protection_id(catalog_id: &str) -> String {
    let digest = Sha256::digest(catalog_id.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(32);
    hex
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    pub catalog_id: String,
    pub protection_id: String,
    pub vip_threshold: u64,
    pub sentinel: String,
    pub output: PathBuf,
    pub tutorial: TutorialConfig,
    pub entry: EntryDefaults,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protection_id.is_empty()
            || !self
                .protection_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "protection_id must be non-empty ASCII letters, digits, '-' or '_': {:?}",
                self.protection_id
            )));
        }
        if self.sentinel.trim().is_empty() || self.sentinel.contains(['\n', '\r']) {
            return Err(ConfigError::Validation(
                "sentinel must be a non-empty single line".into(),
            ));
        }
        if self.sentinel != self.sentinel.trim() {
            return Err(ConfigError::Validation(
                "sentinel must not have surrounding whitespace".into(),
            ));
        }
        if self.catalog_id.is_empty() || self.catalog_id.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "catalog_id must be non-empty and contain no path separators: {:?}",
                self.catalog_id
            )));
        }
        if self.tutorial.host.is_empty() {
            return Err(ConfigError::Validation(
                "tutorial.host must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Settings for tests and library callers that skip config files.
    pub fn new(catalog_id: &str, protection_id: &str, vip_threshold: u64) -> Self {
        Self {
            title: catalog_id.to_string(),
            catalog_id: catalog_id.to_string(),
            protection_id: protection_id.to_string(),
            vip_threshold,
            sentinel: CatalogConfig::default().sentinel,
            output: PathBuf::from(format!("{catalog_id}.json")),
            tutorial: TutorialConfig::default(),
            entry: EntryDefaults::default(),
        }
    }
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CatalogConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load `config_path` over stock defaults, rejecting unknown keys.
pub fn load_config(config_path: &Path) -> Result<CatalogConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match load_raw_config(config_path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// Returns a fully-commented stock `courseware.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Courseware Configuration
# ========================
# Place this file in the lesson directory as courseware.toml.
# All settings are optional. Values shown are the defaults.
# Unknown keys will cause an error.

# Catalog title. Defaults to the catalog id.
# title = "Gomoku"

# Folder identifier used in tutorial links and the output filename.
# Defaults to the lesson directory name.
# catalog_id = "coursedetail.C0002.wuziqi"

# Identifier inserted into backup filenames: 05.advanced.<id>.md
# ASCII letters, digits, '-' and '_' only.
# Defaults to a hash of the catalog id.
# protection_id = "bad985e3e5075b8e98592d4fd7bef049"

# Lessons numbered at or above this are VIP: they are flagged in the
# catalog and their visible file is replaced by the sentinel.
vip_threshold = 5

# Content written into protected lessons.
sentinel = "encrypt"

# Catalog output path, relative to the lesson directory.
# Defaults to ../<catalog_id>.json
# output = "../catalog.json"

# ---------------------------------------------------------------------------
# Tutorial links: https://<host>/api/<api_version>/course/<catalog_id>/<file>
# ---------------------------------------------------------------------------
[tutorial]
host = "doc.itprojects.cn"
api_version = "v1.1"

# ---------------------------------------------------------------------------
# Fields copied into every catalog entry
# ---------------------------------------------------------------------------
[entry]
video = ""
question_answer = ""
product_detail = ""
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = CatalogConfig::default();
        assert_eq!(config.vip_threshold, 5);
        assert_eq!(config.sentinel, "encrypt");
        assert_eq!(config.tutorial.host, "doc.itprojects.cn");
        assert_eq!(config.tutorial.api_version, "v1.1");
        assert!(config.catalog_id.is_none());
    }

    #[test]
    fn tutorial_url_format() {
        let url = TutorialConfig::default().url("coursedetail.C0002", "01.intro.md");
        assert_eq!(
            url,
            "https://doc.itprojects.cn/api/v1.1/course/coursedetail.C0002/01.intro.md"
        );
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn load_config_merges_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
title = "五子棋-人机对战版"
vip_threshold = 3

[tutorial]
host = "example.com"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.title.as_deref(), Some("五子棋-人机对战版"));
        assert_eq!(config.vip_threshold, 3);
        assert_eq!(config.tutorial.host, "example.com");
        // Untouched keys keep defaults
        assert_eq!(config.tutorial.api_version, "v1.1");
        assert_eq!(config.sentinel, "encrypt");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "vip_treshold = 3\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "title = \n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = CatalogConfig {
            title: Some("From file".into()),
            vip_threshold: 3,
            ..CatalogConfig::default()
        };
        config.apply(Overrides {
            vip_threshold: Some(8),
            protection_id: Some("cli".into()),
            ..Overrides::default()
        });
        assert_eq!(config.title.as_deref(), Some("From file"));
        assert_eq!(config.vip_threshold, 8);
        assert_eq!(config.protection_id.as_deref(), Some("cli"));
    }

    #[test]
    fn resolve_derives_ids_from_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("coursedetail.C0002.wuziqi");
        fs::create_dir(&dir).unwrap();

        let settings = CatalogConfig::default().resolve(&dir).unwrap();
        assert_eq!(settings.catalog_id, "coursedetail.C0002.wuziqi");
        assert_eq!(settings.title, "coursedetail.C0002.wuziqi");
        assert_eq!(
            settings.protection_id,
            derive_protection_id("coursedetail.C0002.wuziqi")
        );
        assert_eq!(
            settings.output,
            dir.join("..").join("coursedetail.C0002.wuziqi.json")
        );
    }

    #[test]
    fn resolve_relative_output_against_lesson_dir() {
        let dir = Path::new("/srv/lessons");
        let config = CatalogConfig {
            catalog_id: Some("c1".into()),
            output: Some(PathBuf::from("out/catalog.json")),
            ..CatalogConfig::default()
        };
        let settings = config.resolve(dir).unwrap();
        assert_eq!(settings.output, dir.join("out/catalog.json"));
    }

    #[test]
    fn derived_protection_id_is_stable_hex() {
        let a = derive_protection_id("course");
        assert_eq!(a, derive_protection_id("course"));
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, derive_protection_id("other"));
    }

    #[test]
    fn protection_id_with_period_is_rejected() {
        let config = CatalogConfig {
            catalog_id: Some("c".into()),
            protection_id: Some("a.b".into()),
            ..CatalogConfig::default()
        };
        let err = config.resolve(Path::new("/x")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn multiline_sentinel_is_rejected() {
        let mut settings = Settings::new("c", "id", 5);
        settings.sentinel = "a\nb".into();
        assert!(settings.validate().is_err());
        settings.sentinel = "  ".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn catalog_id_with_separator_is_rejected() {
        let settings = Settings::new("a/b", "id", 5);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: CatalogConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }
}
