//! Collision containers: every node reachable under one spelling of a parent,
//! with the kind and hash that tell them apart.

use super::NodeId;
use super::path::Disambiguation;
use crate::types::SourceLanguage;

/// Shortest suffix that identifies one element among its colliding siblings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Disambiguator {
    /// Stable hash of the precise identifier.
    Hash(String),
    /// Symbol kind, unique among the siblings.
    Kind(String),
}

impl Disambiguator {
    /// Suffix text without the leading dash.
    pub fn text(&self) -> &str {
        return match self {
            Self::Hash(text) | Self::Kind(text) => text,
        };
    }
}

/// All nodes sharing one spelling under one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisambiguationContainer {
    /// Entries in insertion order.
    elements: Vec<Element>,
}

impl DisambiguationContainer {
    /// Entries in insertion order.
    pub fn elements(&self) -> &[Element] {
        return &self.elements;
    }

    /// Entry for `node`, for upgrading a sparse entry in place.
    pub(crate) fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        return self.elements.iter_mut().find(|e| return e.node == node);
    }

    /// Pick the entry a suffix selects.
    ///
    /// Without a suffix a single entry is found and several are ambiguous.
    /// With one, every part it names (kind, hash, language) must match.
    /// `has_language` reports whether a node carries a language spelling.
    pub fn find(
        &self,
        disambiguation: Option<&Disambiguation>,
        has_language: &impl Fn(NodeId, &SourceLanguage) -> bool,
    ) -> Lookup {
        let matches: Vec<NodeId> = match disambiguation {
            None => self.elements.iter().map(|e| return e.node).collect(),
            Some(d) => self
                .elements
                .iter()
                .filter(|e| return e.matches(d, has_language))
                .map(|e| return e.node)
                .collect(),
        };
        return match matches.as_slice() {
            [] => Lookup::NoMatch,
            [only] => Lookup::Found(*only),
            _ => Lookup::Ambiguous(matches),
        };
    }

    /// Whether any entry matches a suffix.
    pub fn has_match(&self, disambiguation: &Disambiguation, has_language: &impl Fn(NodeId, &SourceLanguage) -> bool) -> bool {
        return self.elements.iter().any(|e| return e.matches(disambiguation, has_language));
    }

    /// Add an entry unless its node is already present.
    pub(crate) fn insert(&mut self, element: Element) {
        if !self.elements.iter().any(|e| return e.node == element.node) {
            self.elements.push(element);
        }
    }

    /// Whether the container has no entries.
    pub fn is_empty(&self) -> bool {
        return self.elements.is_empty();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        return self.elements.len();
    }

    /// Minimal disambiguator for every entry, in insertion order.
    pub fn minimal_disambiguators(&self) -> Vec<(NodeId, Option<Disambiguator>)> {
        let elements: Vec<&Element> = self.elements.iter().collect();
        return elements
            .iter()
            .map(|e| return e.node)
            .zip(minimal_disambiguators(&elements))
            .collect();
    }
}

/// One node under a spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Stable hash of the node's symbol. `None` for sparse nodes.
    pub hash: Option<String>,
    /// Kind identifier of the node's symbol. `None` for sparse nodes.
    pub kind: Option<String>,
    /// The node.
    pub node: NodeId,
}

impl Element {
    /// Whether every part a suffix names matches this entry.
    fn matches(&self, d: &Disambiguation, has_language: &impl Fn(NodeId, &SourceLanguage) -> bool) -> bool {
        let kind_matches = d.kind.as_ref().is_none_or(|kind| return self.kind.as_ref() == Some(kind));
        let hash_matches = d.hash.as_ref().is_none_or(|hash| return self.hash.as_ref() == Some(hash));
        let language_matches = d.language.as_ref().is_none_or(|language| return has_language(self.node, language));
        return kind_matches && hash_matches && language_matches;
    }
}

/// Result of [`DisambiguationContainer::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Several entries remain.
    Ambiguous(Vec<NodeId>),
    /// Exactly one entry remains.
    Found(NodeId),
    /// No entry matches.
    NoMatch,
}

/// Minimal disambiguators for a group of colliding entries.
///
/// A lone entry needs none. Otherwise an entry uses its kind when no other
/// entry in the group shares it, and its hash when one does.
pub fn minimal_disambiguators(elements: &[&Element]) -> Vec<Option<Disambiguator>> {
    if elements.len() <= 1 {
        return elements.iter().map(|_| return None).collect();
    }
    return elements
        .iter()
        .map(|element| {
            let kind_is_unique = element.kind.as_ref().is_some_and(|kind| {
                return elements.iter().filter(|other| return other.kind.as_ref() == Some(kind)).count() == 1;
            });
            if kind_is_unique {
                return element.kind.clone().map(Disambiguator::Kind);
            }
            return element.hash.clone().map(Disambiguator::Hash);
        })
        .collect();
}
