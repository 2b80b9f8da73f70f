//! Contract with the external game engine.
//!
//! The engine is a *package* (an [`ArenaModule`]) found by name in a
//! [`ModuleRegistry`]. A package exposes named entry points; one of them creates
//! game instances ([`ArenaGame`]). Which entry point exists depends on the engine
//! release, so the adapter probes [`FACTORY_CANDIDATES`] once and keeps the result.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::Extras;
use crate::error::{EnvError, EnvResult};

/// Package name the TextArena adapter imports.
pub const TEXTARENA_PACKAGE: &str = "textarena";

/// Entry point names tried in order when resolving the game factory.
pub const FACTORY_CANDIDATES: [&str; 3] = ["make", "make_game", "load_game"];

/// Free-form metadata returned by the engine.
pub type Info = Map<String, Value>;

/// Game factory: `(game name, keyword arguments) -> game instance`.
pub type MakeFn = Arc<dyn Fn(&str, &Extras) -> anyhow::Result<Box<dyn ArenaGame>> + Send + Sync>;

/// Raw reset result. Engines return either a bare observation or an
/// `(observation, info)` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ResetOutput {
    /// Observation only.
    Observation(String),
    /// Observation with metadata.
    WithInfo(String, Info),
}

/// Collapse both reset shapes into `(observation, info)`; info defaults to empty.
#[must_use]
pub fn normalize_reset(output: ResetOutput) -> (String, Info) {
    match output {
        ResetOutput::Observation(observation) => (observation, Info::new()),
        ResetOutput::WithInfo(observation, info) => (observation, info),
    }
}

/// Result of one engine step.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStep {
    /// Next observation; empty when the engine has nothing to show.
    pub observation: String,
    /// Reward for the acting player.
    pub reward: f64,
    /// Whether the game has finished.
    pub done: bool,
    /// Engine metadata, passed through untouched.
    pub info: Info,
}

/// One running game owned by an adapter.
pub trait ArenaGame {
    /// Start (or restart) the game.
    ///
    /// # Errors
    ///
    /// Whatever the engine raises.
    fn reset(&mut self) -> anyhow::Result<ResetOutput>;

    /// Apply the acting player's move.
    ///
    /// # Errors
    ///
    /// Whatever the engine raises.
    fn step(&mut self, action: &str) -> anyhow::Result<GameStep>;

    /// Release engine resources.
    ///
    /// # Errors
    ///
    /// Whatever the engine raises.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// An installed engine package.
pub trait ArenaModule: Send + Sync {
    /// Look up an entry point by name.
    fn entry_point(&self, name: &str) -> Option<MakeFn>;
}

/// Probe `module` for the first known factory name.
///
/// # Errors
///
/// [`EnvError::NoFactory`] when none of [`FACTORY_CANDIDATES`] is exposed.
pub fn resolve_factory(package: &str, module: &dyn ArenaModule) -> EnvResult<MakeFn> {
    FACTORY_CANDIDATES
        .iter()
        .find_map(|name| {
            module.entry_point(name).inspect(|_| {
                tracing::debug!(package, entry_point = *name, "resolved game factory");
            })
        })
        .ok_or_else(|| EnvError::NoFactory {
            package: package.to_string(),
        })
}

/// Installed engine packages, looked up by name.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn ArenaModule>>,
}

impl ModuleRegistry {
    /// Empty registry: every import fails with a missing-dependency error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `module` under `package`, replacing any previous entry.
    pub fn register(&mut self, package: impl Into<String>, module: Arc<dyn ArenaModule>) {
        self.modules.insert(package.into(), module);
    }

    /// Builder form of [`ModuleRegistry::register`].
    #[must_use]
    pub fn with_module(mut self, package: impl Into<String>, module: Arc<dyn ArenaModule>) -> Self {
        self.register(package, module);
        self
    }

    /// Fetch an installed package.
    ///
    /// # Errors
    ///
    /// [`EnvError::MissingDependency`] when nothing is registered under `package`.
    pub fn import(&self, package: &str) -> EnvResult<Arc<dyn ArenaModule>> {
        self.modules
            .get(package)
            .cloned()
            .ok_or_else(|| EnvError::MissingDependency {
                package: package.to_string(),
            })
    }

    /// Whether `package` is installed.
    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.modules.contains_key(package)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut packages: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        packages.sort_unstable();
        f.debug_struct("ModuleRegistry")
            .field("packages", &packages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedEntry(&'static str);

    impl ArenaModule for NamedEntry {
        fn entry_point(&self, name: &str) -> Option<MakeFn> {
            if name != self.0 {
                return None;
            }
            let factory: MakeFn = Arc::new(
                |_: &str, _: &Extras| -> anyhow::Result<Box<dyn ArenaGame>> {
                    Err(anyhow::anyhow!("not a real engine"))
                },
            );
            Some(factory)
        }
    }

    #[test]
    fn reset_shapes_normalize() {
        let (obs, info) = normalize_reset(ResetOutput::Observation("hi".into()));
        assert_eq!(obs, "hi");
        assert!(info.is_empty());

        let mut meta = Info::new();
        meta.insert("player".into(), Value::from(0));
        let (obs, info) = normalize_reset(ResetOutput::WithInfo(String::new(), meta.clone()));
        assert!(obs.is_empty());
        assert_eq!(info, meta);
    }

    #[test]
    fn later_candidates_are_probed() {
        assert!(resolve_factory("pkg", &NamedEntry("load_game")).is_ok());
    }

    #[test]
    fn unknown_entry_points_are_incompatible() {
        let err = resolve_factory("pkg", &NamedEntry("create")).err().unwrap();
        assert!(matches!(err, EnvError::NoFactory { ref package } if package == "pkg"));
        assert!(err.is_dependency_error());
    }

    #[test]
    fn empty_registry_reports_missing_dependency() {
        let err = ModuleRegistry::new().import(TEXTARENA_PACKAGE).err().unwrap();
        assert!(matches!(err, EnvError::MissingDependency { .. }));
        assert!(!err.is_config_error());
    }
}
