//! Cache configuration management with precedence and validation
use crate::errors::{Error, RecoveryHint, Result, SerializationOp};
use crate::expiration::{CheckStrategy, ExpirationCheckStrategy, TimeCheckStrategy};
use crate::storage::StorageKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable selecting the storage backend
pub const ENV_STORAGE: &str = "CACHET_CACHE_STORAGE";
/// Environment variable holding the backend size limit
pub const ENV_CAPACITY: &str = "CACHET_CACHE_CAPACITY";
/// Environment variable selecting when expiration sweeps run
pub const ENV_CHECK_STRATEGY: &str = "CACHET_CACHE_CHECK_STRATEGY";
/// Environment variable selecting which timestamp expiration reads
pub const ENV_TIME_CHECK: &str = "CACHET_CACHE_TIME_CHECK";
pub const ENV_CHECK_PERIOD_MS: &str = "CACHET_CACHE_CHECK_PERIOD_MS";
pub const ENV_CHECK_IN_PERIOD_MS: &str = "CACHET_CACHE_CHECK_IN_PERIOD_MS";

/// Construction options a cache can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Storage backend
    #[serde(default)]
    pub storage: StorageKind,
    /// Expiration schedule, applied by [`ExpirationAddin::from_settings`](crate::ExpirationAddin::from_settings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<ExpirationCheckStrategy>,
}

impl CacheSettings {
    /// Check every section, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        if let Some(expiration) = &self.expiration {
            expiration.validate()?;
        }
        Ok(())
    }
}

/// Settings together with where they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: CacheSettings,
    /// Configuration source for debugging
    pub source: ConfigSource,
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Set in code through the builder
    Programmatic,
}

/// Builder for creating cache settings
pub struct CacheSettingsBuilder {
    settings: CacheSettings,
}

impl CacheSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: CacheSettings::default(),
        }
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.settings.storage = storage;
        self
    }

    pub fn with_expiration(mut self, expiration: ExpirationCheckStrategy) -> Self {
        self.settings.expiration = Some(expiration);
        self
    }

    /// Validate and return the settings
    pub fn build(self) -> Result<CacheSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

impl Default for CacheSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level layout of the settings file
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    cache: Option<FileSection>,
}

#[derive(Debug, Default, Deserialize)]
struct FileSection {
    storage: Option<StorageKind>,
    expiration: Option<ExpirationCheckStrategy>,
}

/// Values found in the environment, each optional
#[derive(Debug, Default)]
struct EnvOverrides {
    storage: Option<String>,
    capacity: Option<usize>,
    check: Option<CheckStrategy>,
    time_check: Option<TimeCheckStrategy>,
    check_period: Option<Duration>,
    check_in_period: Option<Duration>,
}

impl EnvOverrides {
    fn is_empty(&self) -> bool {
        self.storage.is_none()
            && self.capacity.is_none()
            && self.check.is_none()
            && self.time_check.is_none()
            && self.check_period.is_none()
            && self.check_in_period.is_none()
    }

    fn touches_expiration(&self) -> bool {
        self.check.is_some()
            || self.time_check.is_some()
            || self.check_period.is_some()
            || self.check_in_period.is_some()
    }
}

/// Configuration loader that handles precedence
///
/// Defaults, then the settings file, then `CACHET_CACHE_*` variables.
pub struct CacheSettingsLoader;

impl CacheSettingsLoader {
    /// Load settings with full precedence handling
    pub fn load() -> Result<LoadedSettings> {
        let mut loaded = LoadedSettings {
            settings: CacheSettings::default(),
            source: ConfigSource::Default,
        };

        let config_path = Self::get_config_file_path()?;
        if config_path.exists() {
            loaded = Self::load_from_path(&config_path)?;
        }

        let overrides = Self::load_from_env()?;
        if !overrides.is_empty() {
            loaded.settings = Self::merge_env(loaded.settings, &overrides)?;
            loaded.source = ConfigSource::EnvironmentVariable("CACHET_CACHE_*".to_string());
        }

        loaded.settings.validate()?;
        tracing::debug!(
            source = ?loaded.source,
            storage = loaded.settings.storage.name(),
            expiration = loaded.settings.expiration.is_some(),
            "cache settings loaded"
        );
        Ok(loaded)
    }

    /// Load settings from an explicit file, without environment overrides
    pub fn load_from_path(path: &Path) -> Result<LoadedSettings> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        let file: SettingsFile = serde_json::from_str(&content).map_err(|e| Error::Serialization {
            key: path.display().to_string(),
            operation: SerializationOp::Decode,
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })?;

        let mut settings = CacheSettings::default();
        if let Some(section) = file.cache {
            if let Some(storage) = section.storage {
                settings.storage = storage;
            }
            settings.expiration = section.expiration;
        }

        settings.validate()?;
        Ok(LoadedSettings {
            settings,
            source: ConfigSource::ConfigFile(path.to_path_buf()),
        })
    }

    /// Read the `CACHET_CACHE_*` variables that are set
    fn load_from_env() -> Result<EnvOverrides> {
        let mut overrides = EnvOverrides::default();

        if let Ok(storage) = std::env::var(ENV_STORAGE) {
            overrides.storage = Some(storage);
        }

        if let Ok(capacity) = std::env::var(ENV_CAPACITY) {
            overrides.capacity = Some(parse_number(ENV_CAPACITY, &capacity)?);
        }

        if let Ok(check) = std::env::var(ENV_CHECK_STRATEGY) {
            overrides.check = Some(check.parse()?);
        }

        if let Ok(time_check) = std::env::var(ENV_TIME_CHECK) {
            overrides.time_check = Some(time_check.parse()?);
        }

        if let Ok(period) = std::env::var(ENV_CHECK_PERIOD_MS) {
            overrides.check_period = Some(Duration::from_millis(parse_number(
                ENV_CHECK_PERIOD_MS,
                &period,
            )?));
        }

        if let Ok(spacing) = std::env::var(ENV_CHECK_IN_PERIOD_MS) {
            overrides.check_in_period = Some(Duration::from_millis(parse_number(
                ENV_CHECK_IN_PERIOD_MS,
                &spacing,
            )?));
        }

        Ok(overrides)
    }

    /// Get the configuration file path
    fn get_config_file_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config_home)
        } else {
            dirs::config_dir().ok_or_else(|| Error::Configuration {
                message: "Could not determine config directory".to_string(),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Set XDG_CONFIG_HOME or HOME environment variable".to_string(),
                },
            })?
        };

        Ok(config_dir.join("cachet").join("cache.json"))
    }

    /// Apply environment overrides on top of file or default settings
    fn merge_env(base: CacheSettings, overrides: &EnvOverrides) -> Result<CacheSettings> {
        let mut settings = base;

        match (&overrides.storage, overrides.capacity) {
            (Some(name), capacity) => {
                settings.storage = StorageKind::parse(name, capacity)?;
            }
            // A bare capacity resizes whichever backend is configured
            (None, Some(capacity)) => {
                settings.storage = match settings.storage {
                    StorageKind::Memory { .. } => StorageKind::Memory {
                        max_entries: Some(capacity),
                    },
                    StorageKind::Lru { .. } => StorageKind::Lru { capacity },
                };
            }
            (None, None) => {}
        }

        if overrides.touches_expiration() {
            let mut expiration = settings.expiration.unwrap_or_default();
            if let Some(check) = overrides.check {
                expiration.check = check;
            }
            if let Some(time_check) = overrides.time_check {
                expiration.time_check = time_check;
            }
            if let Some(period) = overrides.check_period {
                expiration.check_period = period;
            }
            if let Some(spacing) = overrides.check_in_period {
                expiration.check_in_period = spacing;
            }
            settings.expiration = Some(expiration);
        }

        Ok(settings)
    }
}

fn parse_number<T: std::str::FromStr>(variable: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| Error::Configuration {
        message: format!("{variable} must be a non-negative integer, got '{raw}'"),
        recovery_hint: RecoveryHint::UpdateConfiguration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ALL_VARS: [&str; 6] = [
        ENV_STORAGE,
        ENV_CAPACITY,
        ENV_CHECK_STRATEGY,
        ENV_TIME_CHECK,
        ENV_CHECK_PERIOD_MS,
        ENV_CHECK_IN_PERIOD_MS,
    ];

    /// Points XDG_CONFIG_HOME at a temp dir and clears CACHET_ variables
    struct EnvGuard {
        dir: TempDir,
        previous_xdg: Option<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let previous_xdg = std::env::var("XDG_CONFIG_HOME").ok();
            std::env::set_var("XDG_CONFIG_HOME", dir.path());
            for var in ALL_VARS {
                std::env::remove_var(var);
            }
            Self { dir, previous_xdg }
        }

        fn write_config(&self, content: &str) -> PathBuf {
            let config_dir = self.dir.path().join("cachet");
            std::fs::create_dir_all(&config_dir).unwrap();
            let path = config_dir.join("cache.json");
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in ALL_VARS {
                std::env::remove_var(var);
            }
            match &self.previous_xdg {
                Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    #[test]
    fn test_settings_builder() {
        let settings = CacheSettingsBuilder::new()
            .with_storage(StorageKind::Lru { capacity: 64 })
            .with_expiration(ExpirationCheckStrategy::periodic(Duration::from_secs(1)))
            .build()
            .unwrap();

        assert_eq!(settings.storage, StorageKind::Lru { capacity: 64 });
        assert_eq!(
            settings.expiration.map(|e| e.check),
            Some(CheckStrategy::Periodic)
        );
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        let result = CacheSettingsBuilder::new()
            .with_expiration(ExpirationCheckStrategy::periodic(Duration::ZERO))
            .build();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    #[serial]
    fn test_defaults_without_file_or_env() {
        let _guard = EnvGuard::new();
        let loaded = CacheSettingsLoader::load().unwrap();

        assert_eq!(loaded.source, ConfigSource::Default);
        assert_eq!(loaded.settings, CacheSettings::default());
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        let guard = EnvGuard::new();
        let path = guard.write_config(
            r#"{
                "cache": {
                    "storage": { "kind": "lru", "capacity": 128 },
                    "expiration": {
                        "check": "periodic",
                        "time_check": "by_last_access",
                        "check_period_ms": 500,
                        "check_in_period_ms": 500
                    }
                }
            }"#,
        );

        let loaded = CacheSettingsLoader::load().unwrap();
        assert_eq!(loaded.source, ConfigSource::ConfigFile(path));
        assert_eq!(loaded.settings.storage, StorageKind::Lru { capacity: 128 });

        let expiration = loaded.settings.expiration.unwrap();
        assert_eq!(expiration.check, CheckStrategy::Periodic);
        assert_eq!(expiration.time_check, TimeCheckStrategy::ByLastAccess);
        assert_eq!(expiration.check_period, Duration::from_millis(500));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let guard = EnvGuard::new();
        guard.write_config(r#"{ "cache": { "storage": { "kind": "memory" } } }"#);
        std::env::set_var(ENV_STORAGE, "lru");
        std::env::set_var(ENV_CAPACITY, "10");
        std::env::set_var(ENV_CHECK_STRATEGY, "periodic");
        std::env::set_var(ENV_CHECK_PERIOD_MS, "250");

        let loaded = CacheSettingsLoader::load().unwrap();
        assert!(matches!(loaded.source, ConfigSource::EnvironmentVariable(_)));
        assert_eq!(loaded.settings.storage, StorageKind::Lru { capacity: 10 });

        let expiration = loaded.settings.expiration.unwrap();
        assert_eq!(expiration.check, CheckStrategy::Periodic);
        assert_eq!(expiration.check_period, Duration::from_millis(250));
        // untouched fields keep their defaults
        assert_eq!(expiration.time_check, TimeCheckStrategy::ByAddDate);
    }

    #[test]
    #[serial]
    fn test_capacity_alone_resizes_configured_backend() {
        let guard = EnvGuard::new();
        guard.write_config(r#"{ "cache": { "storage": { "kind": "lru", "capacity": 4 } } }"#);
        std::env::set_var(ENV_CAPACITY, "16");

        let loaded = CacheSettingsLoader::load().unwrap();
        assert_eq!(loaded.settings.storage, StorageKind::Lru { capacity: 16 });
        assert_eq!(loaded.settings.expiration, None);
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_configuration_errors() {
        let _guard = EnvGuard::new();

        std::env::set_var(ENV_STORAGE, "redis");
        assert!(matches!(
            CacheSettingsLoader::load(),
            Err(Error::Configuration { .. })
        ));
        std::env::remove_var(ENV_STORAGE);

        std::env::set_var(ENV_CHECK_PERIOD_MS, "soon");
        assert!(matches!(
            CacheSettingsLoader::load(),
            Err(Error::Configuration { .. })
        ));
        std::env::remove_var(ENV_CHECK_PERIOD_MS);

        std::env::set_var(ENV_CHECK_STRATEGY, "periodic");
        std::env::set_var(ENV_CHECK_PERIOD_MS, "0");
        assert!(matches!(
            CacheSettingsLoader::load(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = CacheSettingsLoader::load_from_path(&path);
        assert!(matches!(
            result,
            Err(Error::Serialization {
                operation: SerializationOp::Decode,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = CacheSettingsLoader::load_from_path(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
