use super::{ConfigObject, ConfigValue};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

impl ConfigObject {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            ignores_fallbacks: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.index.get(key).map(|i| &self.entries[*i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Set a key. A new key appends; an existing key is replaced in place so
    /// the original insertion position is kept.
    pub(crate) fn insert(&mut self, key: String, value: ConfigValue) {
        match self.index.get(&key) {
            Some(i) => self.entries[*i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub(crate) fn set_ignores_fallbacks(&mut self, ignores_fallbacks: bool) {
        self.ignores_fallbacks = ignores_fallbacks;
    }
}

impl Default for ConfigObject {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ConfigObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}
