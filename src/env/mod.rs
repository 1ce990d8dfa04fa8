/*!
 * Environment Store
 * Boot environment variables consulted and updated by commands
 */

use ahash::RandomState;
use dashmap::DashMap;
use tracing::debug;

/// Environment variable access
pub trait Environment: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str);

    /// Store `value` as lowercase hex without a prefix
    fn set_hex(&self, name: &str, value: u64) {
        self.set(name, &format!("{:x}", value));
    }
}

/// In-memory environment
#[derive(Debug, Default)]
pub struct EnvStore {
    vars: DashMap<String, String, RandomState>,
}

impl EnvStore {
    pub fn new() -> Self {
        Self {
            vars: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.vars.remove(name).map(|(_, v)| v)
    }

    /// Variables sorted by name
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut vars: Vec<_> = self
            .vars
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        vars.sort();
        vars
    }
}

impl Environment for EnvStore {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).map(|v| v.value().clone())
    }

    fn set(&self, name: &str, value: &str) {
        debug!(name, value, "setenv");
        self.vars.insert(name.to_string(), value.to_string());
    }
}
