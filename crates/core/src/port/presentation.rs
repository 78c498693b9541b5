// Presentation Context Port
// Explicit target for theme variables instead of ambient global style state

use std::collections::BTreeMap;

/// Scope that color variables are assigned into (a document root, a widget tree, ...)
pub trait PresentationContext: Send + Sync {
    /// Assign one variable, replacing any previous value
    fn set_variable(&mut self, key: &str, value: &str);

    /// Remove one variable; removing an absent key is a no-op
    fn remove_variable(&mut self, key: &str);

    /// Current assignments, sorted by key
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// In-memory presentation scope (daemon default and tests)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InMemoryPresentation {
    variables: BTreeMap<String, String>,
}

impl InMemoryPresentation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationContext for InMemoryPresentation {
    fn set_variable(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_string(), value.to_string());
    }

    fn remove_variable(&mut self, key: &str) {
        self.variables.remove(key);
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.variables.clone()
    }
}
