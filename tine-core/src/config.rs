//! A recursive configuration tree.
//!
//! Configuration lives in a [`ConfigTree`]: a mapping whose entries are
//! either leaf [`Value`]s or nested trees. Setting a map value merges it
//! into an existing subtree by default, which is how environment config
//! layers over the global config.

use std::collections::BTreeMap;

use crate::Value;

/// One entry in a config tree: a leaf value or a nested tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigNode {
    /// A scalar, array or null leaf.
    Leaf(Value),
    /// A nested tree.
    Tree(ConfigTree),
}

/// A recursive key-value configuration store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigTree {
    entries: BTreeMap<String, ConfigNode>,
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a value. Map entries become nested trees
    /// recursively; a non-map value produces an empty tree.
    pub fn from_value(value: &Value) -> Self {
        let mut tree = Self::new();
        tree.import(value);
        tree
    }

    /// Imports a map of config data, merging into existing entries.
    pub fn import(&mut self, value: &Value) {
        if let Value::Object(map) = value {
            for (name, entry) in map {
                self.set(name, entry.clone(), true);
            }
        }
    }

    /// Sets a config entry. Map values become nested trees; with `merge`
    /// they merge into an existing subtree instead of replacing it.
    pub fn set(&mut self, name: &str, value: Value, merge: bool) {
        match value {
            Value::Object(_) => {
                if merge
                    && let Some(ConfigNode::Tree(existing)) = self.entries.get_mut(name)
                {
                    existing.import(&value);
                } else {
                    self.entries
                        .insert(name.to_string(), ConfigNode::Tree(Self::from_value(&value)));
                }
            }
            _ => {
                self.entries.insert(name.to_string(), ConfigNode::Leaf(value));
            }
        }
    }

    /// The entry under the name, if it exists.
    pub fn get(&self, name: &str) -> Option<&ConfigNode> {
        self.entries.get(name)
    }

    /// The subtree under the name, if the entry is a tree.
    pub fn get_tree(&self, name: &str) -> Option<&ConfigTree> {
        match self.entries.get(name) {
            Some(ConfigNode::Tree(tree)) => Some(tree),
            _ => None,
        }
    }

    /// Walks a dot-separated path and returns the leaf value at its end.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let (name, rest) = match path.split_once('.') {
            Some((name, rest)) => (name, Some(rest)),
            None => (path, None),
        };
        match (self.entries.get(name), rest) {
            (Some(ConfigNode::Leaf(value)), None) => Some(value),
            (Some(ConfigNode::Tree(tree)), Some(rest)) => tree.get_path(rest),
            _ => None,
        }
    }

    /// The string at a dot-separated path, or the default.
    pub fn path_str<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.get_path(path)
            .and_then(Value::as_str)
            .unwrap_or(default)
    }

    /// The boolean at a dot-separated path, or the default.
    pub fn path_bool(&self, path: &str, default: bool) -> bool {
        self.get_path(path)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Removes an entry and returns it.
    pub fn delete(&mut self, name: &str) -> Option<ConfigNode> {
        self.entries.remove(name)
    }

    /// Exports the entire tree as a value.
    pub fn export(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, node) in &self.entries {
            let value = match node {
                ConfigNode::Leaf(value) => value.clone(),
                ConfigNode::Tree(tree) => tree.export(),
            };
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }
}
