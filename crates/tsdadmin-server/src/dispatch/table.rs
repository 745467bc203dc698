use std::collections::HashMap;
use std::sync::Arc;

use tsdadmin_core::{AdminError, Result};

use crate::commands::{Shutdown, Stats, Version};
use crate::dispatch::Command;

/// Immutable routing key -> command mapping, built once at startup.
pub struct CommandTable {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandTable {
    /// Fails if two commands claim the same routing key.
    pub fn new(commands: impl IntoIterator<Item = Arc<dyn Command>>) -> Result<Self> {
        let mut map: HashMap<&'static str, Arc<dyn Command>> = HashMap::new();
        for cmd in commands {
            let name = cmd.name();
            if map.insert(name, cmd).is_some() {
                return Err(AdminError::internal(format!(
                    "duplicate command routing key: {name:?}"
                )));
            }
        }
        Ok(Self { commands: map })
    }

    /// `diediedie`, `stats` and `version`.
    pub fn builtin() -> Result<Self> {
        Self::new([
            Arc::new(Shutdown) as Arc<dyn Command>,
            Arc::new(Stats),
            Arc::new(Version),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(key)
    }

    /// Registered routing keys, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
