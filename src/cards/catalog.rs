//! Spell catalog - read-only definition lookup.
//!
//! The catalog is an external reference dataset (a JSON map of id to
//! definition fetched once at startup); the engine only reads it.

use rustc_hash::FxHashMap;

use super::spell::{SpellDefinition, SpellId};

/// Registry of spell definitions keyed by catalog id.
///
/// ## Example
///
/// ```
/// use vril_arena::cards::{SpellCatalog, SpellId};
///
/// let catalog = SpellCatalog::from_json_str(r#"{
///     "fire_bolt": {
///         "name": "Fire Bolt",
///         "type": "ATTACK_BASIC",
///         "element": "fire",
///         "chance": 0.85,
///         "vrilRequired": 2,
///         "damages": [{ "element": "fire", "damage": -70 }]
///     }
/// }"#).unwrap();
///
/// assert_eq!(catalog.get(&SpellId::from("fire_bolt")).unwrap().name, "Fire Bolt");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SpellCatalog {
    spells: FxHashMap<SpellId, SpellDefinition>,
}

impl SpellCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from the external JSON dataset (id → definition).
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let spells: FxHashMap<SpellId, SpellDefinition> = serde_json::from_str(json)?;
        Ok(Self { spells })
    }

    /// Register a definition (test/fixture use).
    ///
    /// Panics if the id is already registered.
    pub fn register(&mut self, id: SpellId, spell: SpellDefinition) {
        assert!(
            !self.spells.contains_key(&id),
            "Spell '{id}' already registered"
        );
        self.spells.insert(id, spell);
    }

    /// Get a definition by id.
    #[must_use]
    pub fn get(&self, id: &SpellId) -> Option<&SpellDefinition> {
        self.spells.get(id)
    }

    /// Check whether an id is registered.
    #[must_use]
    pub fn contains(&self, id: &SpellId) -> bool {
        self.spells.contains_key(id)
    }

    /// Number of registered spells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = (&SpellId, &SpellDefinition)> {
        self.spells.iter()
    }
}
