//! Runtime settings loader.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/textgym/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use textgym_env::{EngineCommand, ModuleRegistry, ProcessModule, TEXTARENA_PACKAGE};

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "textgym/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";

/// Merged runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuntimeSettings {
    /// Game engine launch settings.
    #[serde(default)]
    pub engine: EngineSettings,
}

/// How to reach the TextArena engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineSettings {
    /// Program that starts the engine bridge. Unset means no engine is installed.
    pub command: Option<String>,
    /// Arguments for `command`.
    pub args: Option<Vec<String>>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            engine: self.engine.merge(overlay.engine),
        }
    }

    /// Engine packages available under these settings.
    ///
    /// With no `engine.command` the registry is empty, so building an environment
    /// reports the engine as a missing dependency.
    #[must_use]
    pub fn module_registry(&self) -> ModuleRegistry {
        let mut modules = ModuleRegistry::new();
        if let Some(command) = self.engine.engine_command() {
            tracing::debug!(program = %command.program, "textarena engine configured");
            modules.register(TEXTARENA_PACKAGE, Arc::new(ProcessModule::new(command)));
        }
        modules
    }
}

impl EngineSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            command: overlay.command.or(self.command),
            args: overlay.args.or(self.args),
        }
    }

    /// Launch command, when one is configured.
    #[must_use]
    pub fn engine_command(&self) -> Option<EngineCommand> {
        let program = self
            .command
            .as_deref()
            .map(str::trim)
            .filter(|program| !program.is_empty())?;
        Some(EngineCommand {
            program: program.to_string(),
            args: self.args.clone().unwrap_or_default(),
        })
    }
}

/// Load merged runtime settings (user overrides system).
#[must_use]
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
#[must_use]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
#[must_use]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    match serde_yaml::from_str::<Option<RuntimeSettings>>(&raw) {
        Ok(value) => value.unwrap_or_default(),
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    env_path("PRJ_ROOT")
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    let configured = env_path("PRJ_CONFIG_HOME")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME_RELATIVE_PATH));
    if configured.is_absolute() {
        configured
    } else {
        project_root.join(configured)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
