//! Name registry for deck lookups.
//!
//! A `NameRegistry` maps entity names to their index in the owning
//! collection. The deck keeps one registry per lookup class (files, images,
//! styles, cards, items, locations) so finding a name costs one hash lookup
//! instead of a scan over every list.
//!
//! Names are expected to be unique per class. When they are not, the first
//! registration wins, which matches a front-to-back scan of the collections.

use rustc_hash::FxHashMap;

/// Map from entity name to an id or index.
///
/// ## Example
///
/// ```
/// use rust_cardforge::deck::NameRegistry;
///
/// let mut registry = NameRegistry::new();
/// assert!(registry.register("body", 0usize));
/// assert!(!registry.register("body", 1usize));
///
/// assert_eq!(registry.get("body"), Some(0));
/// assert_eq!(registry.get("title"), None);
/// ```
#[derive(Clone, Debug)]
pub struct NameRegistry<Id> {
    by_name: FxHashMap<String, Id>,
}

impl<Id> Default for NameRegistry<Id> {
    fn default() -> Self {
        Self {
            by_name: FxHashMap::default(),
        }
    }
}

impl<Id: Copy> NameRegistry<Id> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name.
    ///
    /// Returns false (and keeps the existing entry) if the name is taken.
    pub fn register(&mut self, name: impl Into<String>, id: Id) -> bool {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            tracing::debug!(name = %name, "duplicate name, keeping first registration");
            return false;
        }
        self.by_name.insert(name, id);
        true
    }

    /// Look up a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Id> {
        self.by_name.get(name).copied()
    }

    /// Check if a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.by_name.clear();
    }
}
