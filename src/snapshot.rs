//! Snapshot persistence: the path hierarchy and linkable-element summaries
//! another documentation build resolves links against.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::hierarchy::disambiguation::{DisambiguationContainer, Element};
use crate::hierarchy::{Node, NodeId, PathHierarchy};
use crate::types::{ResolvedReference, SourceLanguage, SymbolKind};

/// Schema version this build reads and writes.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// What another build needs to show and link to one documented symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDestinationSummary {
    /// First paragraph of the documentation comment.
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// Plain-text declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Interface language of the page.
    pub language: SourceLanguage,
    /// Precise identifier.
    pub precise_id: String,
    /// Canonical reference.
    pub reference: ResolvedReference,
    /// Display title.
    pub title: String,
}

impl LinkDestinationSummary {
    /// Text shown next to this symbol in disambiguation solutions.
    pub fn hint(&self) -> &str {
        return self.declaration.as_deref().unwrap_or(&self.title);
    }
}

/// Versioned, self-contained form of a path hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResolutionSnapshot {
    /// Bundle the hierarchy was built for.
    pub bundle_id: String,
    /// Flattened tree.
    pub hierarchy: SerializedHierarchy,
    /// Schema version.
    pub version: u32,
}

impl LinkResolutionSnapshot {
    /// Parse snapshot JSON, checking the schema version before the body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is not a snapshot,
    /// or `Error::SnapshotVersion` if it was written by another schema.
    pub fn decode(content: &str) -> Result<Self, Error> {
        let probe: VersionProbe = serde_json::from_str(content)?;
        if probe.version != SNAPSHOT_SCHEMA_VERSION {
            return Err(Error::SnapshotVersion { expected: SNAPSHOT_SCHEMA_VERSION, found: probe.version });
        }
        return Ok(serde_json::from_str(content)?);
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn encode(&self) -> Result<String, Error> {
        return Ok(serde_json::to_string_pretty(self)?);
    }

    /// Flatten a built hierarchy.
    pub fn from_hierarchy(bundle_id: &str, hierarchy: &PathHierarchy) -> Self {
        let symbols: Vec<SerializedSymbol> = hierarchy
            .primary_nodes()
            .iter()
            .map(|(precise_id, node)| return SerializedSymbol { precise_id: precise_id.clone(), primary_node: node.index() })
            .collect();
        let symbol_index: HashMap<&str, usize> =
            symbols.iter().enumerate().map(|(index, s)| return (s.precise_id.as_str(), index)).collect();

        let nodes = hierarchy
            .nodes()
            .map(|(_, node)| {
                let children = node
                    .children
                    .iter()
                    .flat_map(|(name, container)| {
                        return container.elements().iter().map(move |element| {
                            return SerializedElement {
                                hash: element.hash.clone(),
                                kind: element.kind.clone(),
                                name: name.clone(),
                                node: element.node.index(),
                            };
                        });
                    })
                    .collect();
                return SerializedNode {
                    children,
                    languages: node.languages.iter().cloned().collect(),
                    name: node.name.clone(),
                    symbol: node.symbol.as_deref().and_then(|id| return symbol_index.get(id).copied()),
                };
            })
            .collect();

        return Self {
            bundle_id: bundle_id.to_string(),
            hierarchy: SerializedHierarchy { nodes, symbols },
            version: SNAPSHOT_SCHEMA_VERSION,
        };
    }

    /// Rebuild the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotCorrupt` if an index is out of range, a node
    /// has two parents, or a node can't be reached from the root.
    pub fn into_hierarchy(self) -> Result<PathHierarchy, Error> {
        let SerializedHierarchy { nodes: serialized, symbols } = self.hierarchy;
        let node_count = serialized.len();
        if node_count == 0 {
            return Err(corrupt("hierarchy has no root node"));
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; node_count];
        for (index, node) in serialized.iter().enumerate() {
            for child in &node.children {
                if child.node == 0 || child.node >= node_count {
                    return Err(corrupt(&format!("node {index} has child index {} out of range", child.node)));
                }
                let Some(slot) = parents.get_mut(child.node) else {
                    return Err(corrupt(&format!("node {index} has child index {} out of range", child.node)));
                };
                if slot.is_some_and(|existing| return existing.index() != index) {
                    return Err(corrupt(&format!("node {} has two parents", child.node)));
                }
                *slot = Some(NodeId::new(index));
            }
        }
        let mut reached = vec![false; node_count];
        let mut pending = vec![PathHierarchy::ROOT.index()];
        while let Some(index) = pending.pop() {
            let Some(seen) = reached.get_mut(index).filter(|seen| return !**seen) else {
                continue;
            };
            *seen = true;
            if let Some(node) = serialized.get(index) {
                pending.extend(node.children.iter().map(|child| return child.node));
            }
        }
        if let Some(orphan) = reached.iter().position(|seen| return !*seen) {
            return Err(corrupt(&format!("node {orphan} is unreachable")));
        }

        let mut primary_nodes = BTreeMap::new();
        for symbol in &symbols {
            if symbol.primary_node >= node_count {
                return Err(corrupt(&format!("symbol '{}' has node index {} out of range", symbol.precise_id, symbol.primary_node)));
            }
            primary_nodes.insert(symbol.precise_id.clone(), NodeId::new(symbol.primary_node));
        }

        let mut nodes = Vec::with_capacity(node_count);
        for (node, parent) in serialized.into_iter().zip(parents) {
            let symbol = match node.symbol {
                None => None,
                Some(index) => match symbols.get(index) {
                    Some(s) => Some(s.precise_id.clone()),
                    None => return Err(corrupt(&format!("node '{}' has symbol index {index} out of range", node.name))),
                },
            };
            let mut children: BTreeMap<String, DisambiguationContainer> = BTreeMap::new();
            for child in node.children {
                children.entry(child.name).or_default().insert(Element {
                    hash: child.hash,
                    kind: child.kind,
                    node: NodeId::new(child.node),
                });
            }
            nodes.push(Node {
                children,
                languages: node.languages.into_iter().collect::<BTreeSet<_>>(),
                name: node.name,
                parent,
                symbol,
            });
        }

        return Ok(PathHierarchy::from_parts(nodes, primary_nodes));
    }

    /// Read and decode a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or the errors of [`Self::decode`].
    pub fn read(path: &Path) -> Result<Self, Error> {
        return Self::decode(&read_file(path)?);
    }

    /// Write the snapshot to disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = self.encode()?;
        std::fs::write(path, content)?;
        return Ok(());
    }
}

/// One entry of a child container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedElement {
    /// Hash suffix. Absent for sparse nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Kind suffix. Absent for sparse nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Spelling the entry sits under.
    pub name: String,
    /// Index of the child node.
    pub node: usize,
}

/// Node arena and symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedHierarchy {
    /// Nodes; index 0 is the root.
    pub nodes: Vec<SerializedNode>,
    /// Every symbol and its primary node.
    pub symbols: Vec<SerializedSymbol>,
}

/// One node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Child entries, grouped by spelling in spelling order.
    #[serde(default)]
    pub children: Vec<SerializedElement>,
    /// Languages that spell a path through the node.
    #[serde(default)]
    pub languages: Vec<SourceLanguage>,
    /// Spelling.
    pub name: String,
    /// Index into the symbol table. Absent for sparse nodes and the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<usize>,
}

/// One symbol table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSymbol {
    /// Precise identifier.
    pub precise_id: String,
    /// Index of the node that decides the symbol's canonical path.
    pub primary_node: usize,
}

/// Just the version field, read before committing to the full schema.
#[derive(Deserialize)]
struct VersionProbe {
    /// Schema version.
    version: u32,
}

/// Build a corruption error.
fn corrupt(reason: &str) -> Error {
    return Error::SnapshotCorrupt { reason: reason.to_string() };
}

/// Read a file, mapping a missing file to `Error::FileNotFound`.
fn read_file(path: &Path) -> Result<String, Error> {
    return match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound { path: path.to_path_buf() }),
        Err(e) => Err(Error::Io(e)),
        Ok(c) => Ok(c),
    };
}

/// Read a JSON array of summaries.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file doesn't exist,
/// `Error::Io` for other read failures,
/// or `Error::Json` if the content is not a summary list.
pub fn read_summaries(path: &Path) -> Result<Vec<LinkDestinationSummary>, Error> {
    return Ok(serde_json::from_str(&read_file(path)?)?);
}

/// Write summaries as a JSON array.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails,
/// or `Error::Io` if the file cannot be written.
pub fn write_summaries(path: &Path, summaries: &[LinkDestinationSummary]) -> Result<(), Error> {
    std::fs::write(path, serde_json::to_string_pretty(summaries)?)?;
    return Ok(());
}
