use crate::adapters::checkers::IamEdgeChecker;
use crate::app::pool::CpuPool;
use crate::domain::ports::{Authorizer, EdgeChecker};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Shared resources handed to every checker factory of one run
#[derive(Clone)]
pub struct CheckerEnv {
    pub pool: CpuPool,
    pub authorizer: Arc<dyn Authorizer>,
    pub debug: bool,
}

pub type CheckerFactory = Arc<dyn Fn(&CheckerEnv) -> Arc<dyn EdgeChecker> + Send + Sync>;

/// Named checker variants known to a dispatcher.
#[derive(Clone, Default)]
pub struct CheckerRegistry {
    factories: BTreeMap<String, CheckerFactory>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the checkers shipped in this crate.
    pub fn builtin() -> Self {
        Self::new().register("iam", |env: &CheckerEnv| {
            Arc::new(
                IamEdgeChecker::new(env.pool.clone(), Arc::clone(&env.authorizer))
                    .with_debug(env.debug),
            ) as Arc<dyn EdgeChecker>
        })
    }

    /// Adds (or replaces) a variant.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&CheckerEnv) -> Arc<dyn EdgeChecker> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Keeps the recognized names in input order, each once. Unknown names
    /// are dropped without error.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        let mut selected: Vec<String> = Vec::new();
        for name in requested.iter().map(AsRef::as_ref) {
            if !self.contains(name) {
                debug!(checker = name, "Ignoring unknown checker");
                continue;
            }
            if !selected.iter().any(|s| s == name) {
                selected.push(name.to_string());
            }
        }
        selected
    }

    pub fn build(&self, name: &str, env: &CheckerEnv) -> Option<Arc<dyn EdgeChecker>> {
        self.factories.get(name).map(|factory| factory(env))
    }
}
