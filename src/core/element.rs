//! Elements and element matching.
//!
//! The engine does not hardcode an element roster - the external spell
//! catalog decides which elements exist. Blades, shields and auras match
//! spells either by a concrete element or by the `"all"` wildcard.

use serde::{Deserialize, Serialize};

/// An element name from the external catalog (e.g. `"fire"`, `"storm"`).
///
/// Opaque to the engine: two elements are equal iff their names are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Element(pub String);

impl Element {
    /// Create an element from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Element {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Element matcher carried by blades, shields and aura modifiers.
///
/// Serializes as the plain element name, with `"all"` reserved for the
/// wildcard, matching the catalog's wire format.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementFilter {
    /// Matches every element.
    All,
    /// Matches one concrete element.
    Only(Element),
}

impl ElementFilter {
    /// Check whether this filter matches the given element.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            ElementFilter::All => true,
            ElementFilter::Only(e) => e == element,
        }
    }
}

impl From<String> for ElementFilter {
    fn from(name: String) -> Self {
        if name == "all" {
            ElementFilter::All
        } else {
            ElementFilter::Only(Element(name))
        }
    }
}

impl From<ElementFilter> for String {
    fn from(filter: ElementFilter) -> Self {
        match filter {
            ElementFilter::All => "all".to_owned(),
            ElementFilter::Only(e) => e.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let fire = Element::from("fire");
        let ice = Element::from("ice");

        assert!(ElementFilter::All.matches(&fire));
        assert!(ElementFilter::All.matches(&ice));
        assert!(ElementFilter::Only(fire.clone()).matches(&fire));
        assert!(!ElementFilter::Only(fire).matches(&ice));
    }

    #[test]
    fn test_filter_serde() {
        let all: ElementFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, ElementFilter::All);

        let fire: ElementFilter = serde_json::from_str("\"fire\"").unwrap();
        assert_eq!(fire, ElementFilter::Only(Element::from("fire")));

        assert_eq!(serde_json::to_string(&all).unwrap(), "\"all\"");
        assert_eq!(serde_json::to_string(&fire).unwrap(), "\"fire\"");
    }

    #[test]
    fn test_element_serde_transparent() {
        let e = Element::from("storm");
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"storm\"");
    }
}
