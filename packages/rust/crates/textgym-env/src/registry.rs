//! Environment registry: builds environments from the `env_class` tag stored in datasets.

use std::collections::HashMap;
use std::fmt;

use crate::config::{EnvConfig, Extras};
use crate::engine::ModuleRegistry;
use crate::env::TextEnv;
use crate::error::{EnvError, EnvResult};
use crate::textarena::{TEXTARENA_ENV_CLASS, TextArenaEnv};

/// Constructor stored for one environment class.
pub type EnvConstructor =
    fn(&EnvConfig, Option<Extras>, &ModuleRegistry) -> EnvResult<Box<dyn TextEnv>>;

/// Maps environment class tags to constructors.
#[derive(Clone, Default)]
pub struct EnvRegistry {
    entries: HashMap<String, EnvConstructor>,
}

impl EnvRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every environment shipped in this crate.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TEXTARENA_ENV_CLASS, make_textarena);
        registry
    }

    /// Register `constructor` under `env_class`, replacing any previous entry.
    pub fn register(&mut self, env_class: impl Into<String>, constructor: EnvConstructor) {
        self.entries.insert(env_class.into(), constructor);
    }

    /// Registered class tags, sorted.
    #[must_use]
    pub fn env_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        classes.sort_unstable();
        classes
    }

    /// Build an environment by class tag.
    ///
    /// # Errors
    ///
    /// [`EnvError::UnknownEnvClass`] for unregistered tags, otherwise whatever the
    /// constructor returns.
    pub fn make(
        &self,
        env_class: &str,
        config: &EnvConfig,
        extras: Option<Extras>,
        modules: &ModuleRegistry,
    ) -> EnvResult<Box<dyn TextEnv>> {
        let constructor = self
            .entries
            .get(env_class)
            .ok_or_else(|| EnvError::UnknownEnvClass(env_class.to_string()))?;
        constructor(config, extras, modules)
    }
}

fn make_textarena(
    config: &EnvConfig,
    extras: Option<Extras>,
    modules: &ModuleRegistry,
) -> EnvResult<Box<dyn TextEnv>> {
    let env = TextArenaEnv::new(config, extras, modules)?;
    Ok(Box::new(env))
}

impl fmt::Debug for EnvRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvRegistry")
            .field("env_classes", &self.env_classes())
            .finish()
    }
}
