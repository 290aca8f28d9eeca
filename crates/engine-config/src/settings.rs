use crate::{env::EnvManager, error::ConfigError};
use model::fetch::list::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};
use tracing::debug;

pub const ENV_PAGE_SIZE: &str = "DPV_PAGE_SIZE";
pub const ENV_ITERATION_LIMIT: &str = "DPV_ITERATION_LIMIT";
pub const ENV_LOG: &str = "DPV_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Tuning knobs of the fetch fallbacks and the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Rows requested per page when a fallback iterates a provider.
    pub page_size: usize,

    /// Upper bound of rows a fallback may read before giving up.
    pub iteration_limit: Option<usize>,

    pub log_filter: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            iteration_limit: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl FetchSettings {
    /// Defaults, then the optional JSON file, then the environment.
    pub fn load(path: Option<&Path>, env: &EnvManager) -> Result<Self, ConfigError> {
        let mut builder = match path {
            Some(path) => FetchSettingsBuilder::from_file(path)?,
            None => FetchSettingsBuilder::default(),
        };
        builder.apply_env(env)?;
        builder.build()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        FetchSettingsBuilder::from_json(json)?.build()
    }
}

/// Partially specified settings. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchSettingsBuilder {
    pub page_size: Option<usize>,
    pub iteration_limit: Option<usize>,
    pub log_filter: Option<String>,
}

impl FetchSettingsBuilder {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded settings file");
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn apply_env(&mut self, env: &EnvManager) -> Result<(), ConfigError> {
        if let Some(value) = env.get(ENV_PAGE_SIZE) {
            self.page_size = Some(parse_var(ENV_PAGE_SIZE, value)?);
        }
        if let Some(value) = env.get(ENV_ITERATION_LIMIT) {
            self.iteration_limit = Some(parse_var(ENV_ITERATION_LIMIT, value)?);
        }
        if let Some(value) = env.get(ENV_LOG) {
            self.log_filter = Some(value.to_string());
        }
        Ok(())
    }

    pub fn build(self) -> Result<FetchSettings, ConfigError> {
        let defaults = FetchSettings::default();
        let settings = FetchSettings {
            page_size: self.page_size.unwrap_or(defaults.page_size),
            iteration_limit: self.iteration_limit,
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
        };

        if settings.page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if settings.iteration_limit == Some(0) {
            return Err(ConfigError::Invalid {
                name: "iteration_limit".to_string(),
                reason: "must be greater than zero when set".to_string(),
            });
        }

        Ok(settings)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::load(None, &EnvManager::default()).unwrap();
        assert_eq!(settings, FetchSettings::default());
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.iteration_limit, None);
    }

    #[test]
    fn test_builder() {
        let settings = FetchSettingsBuilder::default()
            .page_size(10)
            .iteration_limit(100)
            .log_filter("debug")
            .build()
            .unwrap();

        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.iteration_limit, Some(100));
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"page_size": 40, "log_filter": "warn"}}"#).unwrap();

        let env = EnvManager::from_pairs([(ENV_PAGE_SIZE, "7"), (ENV_ITERATION_LIMIT, "70")]);
        let settings = FetchSettings::load(Some(file.path()), &env).unwrap();

        assert_eq!(settings.page_size, 7);
        assert_eq!(settings.iteration_limit, Some(70));
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = FetchSettings::from_json(r#"{"page_size": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "page_size"));
    }

    #[test]
    fn test_bad_env_value() {
        let env = EnvManager::from_pairs([(ENV_PAGE_SIZE, "lots")]);
        assert!(FetchSettings::load(None, &env).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            FetchSettings::from_json("{ page_size: "),
            Err(ConfigError::Json(_))
        ));
    }
}
