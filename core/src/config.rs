//! Engine configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (`weave.toml` in the working directory, or an explicit path)
//! 3. inline TOML supplied to the builder
//! 4. `WEAVE_*` environment variables (e.g. `WEAVE_MAX_STEPS=500`)
//! 5. explicit builder overrides (CLI flags)

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::interpreter::spawn::check_thread_name;
use crate::interpreter::{EngineError, SpawnerKind};

pub const DEFAULT_THREAD_NAME: &str = "weave-branch";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Step budget per engine; 0 means unlimited
    pub max_steps: i64,

    /// How split branches are launched
    pub spawner: SpawnerKind,

    /// Thread name for branches when `spawner = "thread"`
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 0,
            spawner: SpawnerKind::Thread,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_steps < 0 {
            return Err(EngineError::InvalidMaxSteps(self.max_steps));
        }
        if self.thread_name.trim().is_empty() {
            return Err(EngineError::Config("thread_name must not be empty".to_string()));
        }
        check_thread_name(&self.thread_name).map_err(EngineError::Config)?;
        Ok(())
    }
}

/// Layered loader for [`EngineConfig`]
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config_path: Option<PathBuf>,
    inline_toml: Option<String>,
    use_env: bool,
    env_prefix: Option<String>,
    skip_default_file: bool,
    max_steps: Option<i64>,
    spawner: Option<SpawnerKind>,
}

impl EngineConfigBuilder {
    /// Explicit config file (must exist). Replaces the `weave.toml` search
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// TOML text layered over the file source
    pub fn toml(mut self, source: impl Into<String>) -> Self {
        self.inline_toml = Some(source.into());
        self
    }

    /// Read `WEAVE_*` environment variables
    pub fn from_env(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    /// Environment prefix, `WEAVE` unless set
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Do not look for `weave.toml` in the working directory
    pub fn skip_default_file(mut self, skip: bool) -> Self {
        self.skip_default_file = skip;
        self
    }

    pub fn max_steps(mut self, max_steps: Option<i64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn spawner(mut self, spawner: Option<SpawnerKind>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn build(self) -> Result<EngineConfig, EngineError> {
        let defaults = EngineConfig::default();
        let mut builder = Config::builder()
            .set_default("max_steps", defaults.max_steps)?
            .set_default("spawner", defaults.spawner.as_str())?
            .set_default("thread_name", defaults.thread_name)?;

        if let Some(path) = &self.config_path {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        } else if !self.skip_default_file {
            builder = builder.add_source(File::with_name("weave").required(false));
        }

        if let Some(source) = &self.inline_toml {
            builder = builder.add_source(File::from_str(source, FileFormat::Toml));
        }

        if self.use_env {
            let prefix = self.env_prefix.as_deref().unwrap_or("WEAVE");
            builder = builder.add_source(Environment::with_prefix(prefix).try_parsing(true));
        }

        if let Some(max_steps) = self.max_steps {
            builder = builder.set_override("max_steps", max_steps)?;
        }
        if let Some(spawner) = self.spawner {
            builder = builder.set_override("spawner", spawner.as_str())?;
        }

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> EngineConfigBuilder {
        EngineConfig::builder().skip_default_file(true)
    }

    #[test]
    fn test_defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_steps, 0);
        assert_eq!(config.spawner, SpawnerKind::Thread);
    }

    #[test]
    fn test_inline_toml() {
        let config = builder()
            .toml(
                r#"
                max_steps = 250
                spawner = "tokio"
                thread_name = "worker"
                "#,
            )
            .build()
            .unwrap();

        assert_eq!(config.max_steps, 250);
        assert_eq!(config.spawner, SpawnerKind::Tokio);
        assert_eq!(config.thread_name, "worker");
    }

    #[test]
    fn test_overrides_beat_toml() {
        let config = builder()
            .toml("max_steps = 250\nspawner = \"tokio\"")
            .max_steps(Some(10))
            .spawner(Some(SpawnerKind::Thread))
            .build()
            .unwrap();

        assert_eq!(config.max_steps, 10);
        assert_eq!(config.spawner, SpawnerKind::Thread);
    }

    #[test]
    fn test_negative_max_steps_rejected() {
        let err = builder()
            .max_steps(Some(-3))
            .build()
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidMaxSteps(-3));
    }

    #[test]
    fn test_unknown_spawner_rejected() {
        let err = builder()
            .toml("spawner = \"fibers\"")
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_rejected() {
        let err = builder()
            .config_path(Some(PathBuf::from("/nonexistent/weave.toml")))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_empty_thread_name_rejected() {
        let err = builder()
            .toml("thread_name = \"  \"")
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_nul_in_thread_name_rejected() {
        let err = builder()
            .toml("thread_name = \"a\\u0000b\"")
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_env_layer_between_file_and_overrides() {
        let prefix = "WEAVE_CONFIG_ENV_TEST";
        std::env::set_var("WEAVE_CONFIG_ENV_TEST_MAX_STEPS", "40");
        std::env::set_var("WEAVE_CONFIG_ENV_TEST_SPAWNER", "tokio");

        let from_env = builder()
            .toml("max_steps = 250\nspawner = \"thread\"")
            .from_env(true)
            .env_prefix(prefix)
            .build();
        let overridden = builder()
            .toml("max_steps = 250")
            .from_env(true)
            .env_prefix(prefix)
            .max_steps(Some(7))
            .build();
        let ignored = builder().toml("max_steps = 250").env_prefix(prefix).build();

        std::env::remove_var("WEAVE_CONFIG_ENV_TEST_MAX_STEPS");
        std::env::remove_var("WEAVE_CONFIG_ENV_TEST_SPAWNER");

        let from_env = from_env.unwrap();
        assert_eq!(from_env.max_steps, 40);
        assert_eq!(from_env.spawner, SpawnerKind::Tokio);
        assert_eq!(overridden.unwrap().max_steps, 7);
        assert_eq!(ignored.unwrap().max_steps, 250);
    }
}
