//! Symbol graph input: the JSON a compiler emits per module, and the files
//! it lives in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::Error;
use crate::symbol::{DocComment, SourceOrigin, Symbol};
use crate::types::{GenericConstraint, Selector, SourceLanguage, SymbolKind};

/// File name suffix of symbol graph files.
const SYMBOL_GRAPH_SUFFIX: &str = ".symbols.json";

/// One token of a declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclarationFragment {
    /// Source text of the token.
    pub spelling: String,
}

/// Documentation comment as the graph records it.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocComment {
    /// One entry per comment line.
    #[serde(default)]
    pub lines: Vec<GraphDocLine>,
    /// Module the comment was written in.
    #[serde(default)]
    pub module: Option<String>,
}

/// One line of a documentation comment.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocLine {
    /// Line text without the comment marker.
    pub text: String,
}

/// Symbol kind as the graph records it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphKind {
    /// Human-readable kind name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Kind identifier, possibly language-prefixed (`swift.enum.case`).
    pub identifier: String,
}

/// Module the graph was extracted from.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphModule {
    /// Module name.
    pub name: String,
    /// Platform the module was built for.
    #[serde(default)]
    pub platform: Option<GraphPlatform>,
}

/// Symbol names.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphNames {
    /// Display title.
    pub title: String,
}

/// Build platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPlatform {
    /// Operating system, when the graph names one.
    #[serde(default)]
    pub operating_system: Option<OperatingSystem>,
}

/// Directed, typed edge between two symbols.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRelationship {
    /// Edge kind.
    pub kind: RelationshipKind,
    /// Precise identifier of the source symbol.
    pub source: String,
    /// Original declaration of an inherited source.
    #[serde(default)]
    pub source_origin: Option<SourceOrigin>,
    /// Generic constraints under which the edge holds.
    #[serde(default)]
    pub swift_constraints: Vec<GenericConstraint>,
    /// Precise identifier of the target symbol.
    pub target: String,
    /// Display name of the target, for targets outside the graph.
    #[serde(default)]
    pub target_fallback: Option<String>,
}

/// One symbol entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSymbol {
    /// Declaration tokens.
    #[serde(default)]
    pub declaration_fragments: Vec<DeclarationFragment>,
    /// Documentation comment.
    #[serde(default)]
    pub doc_comment: Option<GraphDocComment>,
    /// Precise identifier and language.
    pub identifier: SymbolIdentifier,
    /// Kind.
    pub kind: GraphKind,
    /// Names.
    pub names: GraphNames,
    /// Path below the module, in this graph's language.
    pub path_components: Vec<String>,
}

impl GraphSymbol {
    /// Convert into a model symbol belonging to `module`.
    pub fn to_symbol(&self, module: &str) -> Symbol {
        let language = SourceLanguage::from_identifier(&self.identifier.interface_language);
        let declaration = if self.declaration_fragments.is_empty() {
            None
        } else {
            Some(self.declaration_fragments.iter().map(|f| return f.spelling.as_str()).collect::<String>())
        };
        let doc_comment = self.doc_comment.as_ref().map(|comment| {
            return DocComment {
                lines: comment.lines.iter().map(|line| return line.text.clone()).collect(),
                module: comment.module.clone(),
            };
        });

        let mut names = BTreeMap::new();
        names.insert(language.clone(), self.path_components.clone());

        return Symbol {
            declaration,
            default_implementations: BTreeMap::new(),
            doc_comment,
            is_required: false,
            kind: SymbolKind::from_identifier(&self.kind.identifier),
            language,
            module: module.to_string(),
            names,
            origin: None,
            precise_id: self.identifier.precise.clone(),
            relationships: BTreeMap::new(),
            swift_extension: None,
            title: self.names.title.clone(),
        };
    }
}

/// Operating system name.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatingSystem {
    /// Name such as `macosx` or `ios`.
    pub name: String,
}

/// Relationship kinds. Kinds this crate doesn't act on deserialize to `Other`.
#[allow(clippy::arbitrary_source_item_ordering, reason = "serde requires the `other` variant last")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// The source conforms to the target protocol.
    ConformsTo,
    /// The source extended type is declared in the target extended module.
    DeclaredIn,
    /// The source provides a default implementation of the target requirement.
    DefaultImplementationOf,
    /// The source extension extends the target type.
    ExtensionTo,
    /// The source inherits from the target.
    InheritsFrom,
    /// The source is a member of the target.
    MemberOf,
    /// The source is an optional requirement of the target protocol.
    OptionalRequirementOf,
    /// The source overrides the target.
    Overrides,
    /// The source is a required member of the target protocol.
    RequirementOf,
    // `#[serde(other)]` has to be on the last variant.
    /// Any kind not listed here.
    #[serde(other)]
    Other,
}

/// A module's symbol graph.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolGraph {
    /// Module the symbols belong to.
    pub module: GraphModule,
    /// Typed edges between symbols.
    #[serde(default)]
    pub relationships: Vec<GraphRelationship>,
    /// Symbols declared by the module.
    #[serde(default)]
    pub symbols: Vec<GraphSymbol>,
}

impl SymbolGraph {
    /// Interface language of the graph, taken from its symbols. A graph
    /// without symbols is treated as Swift.
    pub fn language(&self) -> SourceLanguage {
        return self
            .symbols
            .first()
            .map_or(SourceLanguage::Swift, |symbol| {
                return SourceLanguage::from_identifier(&symbol.identifier.interface_language);
            });
    }

    /// Read and parse one symbol graph file.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::Json` if the content is not a symbol graph.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse symbol graph JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is not a symbol graph.
    pub fn parse(content: &str) -> Result<Self, Error> {
        return Ok(serde_json::from_str(content)?);
    }

    /// Selector the graph's relationships are stored under.
    pub fn selector(&self) -> Selector {
        let platform = self
            .module
            .platform
            .as_ref()
            .and_then(|p| return p.operating_system.as_ref())
            .map(|os| return os.name.clone());
        return Selector { interface_language: self.language(), platform };
    }
}

/// Precise identifier and language of a symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolIdentifier {
    /// Language the graph was extracted for.
    pub interface_language: String,
    /// Stable identifier.
    pub precise: String,
}

/// Expand files and directories into the symbol graph files they name.
/// Directories are searched recursively for `*.symbols.json`; files are
/// taken as given. Results are sorted so loading order is stable.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if a path doesn't exist,
/// or `Error::NoSymbolGraphs` if nothing was found.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>, Error> {
    let mut found = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut in_dir: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| return e.file_type().is_file())
                .filter(|e| return e.file_name().to_string_lossy().ends_with(SYMBOL_GRAPH_SUFFIX))
                .map(|e| return e.path().to_path_buf())
                .collect();
            in_dir.sort();
            found.extend(in_dir);
        } else if path.exists() {
            found.push(path.clone());
        } else {
            return Err(Error::FileNotFound { path: path.clone() });
        }
    }

    if found.is_empty() {
        return Err(Error::NoSymbolGraphs { searched: paths.to_vec() });
    }
    return Ok(found);
}

/// Discover and load every symbol graph under `paths`.
///
/// # Errors
///
/// Returns errors from [`discover`] and [`SymbolGraph::load`].
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<SymbolGraph>, Error> {
    let files = discover(paths)?;
    let mut graphs = Vec::with_capacity(files.len());
    for file in &files {
        tracing::debug!(path = %file.display(), "loading symbol graph");
        graphs.push(SymbolGraph::load(file)?);
    }
    return Ok(graphs);
}

#[cfg(test)]
mod tests {
    use super::{RelationshipKind, SymbolGraph, discover};
    use crate::error::Error;
    use crate::types::{ConstraintKind, SourceLanguage, SymbolKind};

    const GRAPH: &str = r#"{
        "metadata": { "formatVersion": { "major": 0, "minor": 6, "patch": 0 } },
        "module": { "name": "Kit", "platform": { "operatingSystem": { "name": "macosx" } } },
        "symbols": [{
            "identifier": { "precise": "s:3Kit4KindO4caseyA2CmF", "interfaceLanguage": "swift" },
            "kind": { "identifier": "swift.enum.case", "displayName": "Case" },
            "names": { "title": "Kind.case" },
            "pathComponents": ["Kind", "case"],
            "declarationFragments": [
                { "kind": "keyword", "spelling": "case" },
                { "kind": "text", "spelling": " " },
                { "kind": "identifier", "spelling": "case" }
            ],
            "docComment": { "module": "Kit", "lines": [{ "text": "A case." }] }
        }],
        "relationships": [
            { "source": "a", "target": "b", "kind": "conformsTo", "targetFallback": "Swift.Equatable",
              "swiftConstraints": [{ "kind": "sameType", "lhs": "Self", "rhs": "Int" }] },
            { "source": "a", "target": "b", "kind": "someFutureKind" }
        ]
    }"#;

    #[test]
    fn parses_symbols_and_relationships() {
        let graph = SymbolGraph::parse(GRAPH).unwrap();
        assert_eq!(graph.language(), SourceLanguage::Swift);
        assert_eq!(graph.selector().to_string(), "swift@macosx");

        let symbol = graph.symbols[0].to_symbol(&graph.module.name);
        assert_eq!(symbol.kind, SymbolKind::EnumCase);
        assert_eq!(symbol.declaration.as_deref(), Some("case case"));
        assert_eq!(symbol.path_components(), ["Kind".to_string(), "case".to_string()]);
        assert_eq!(symbol.doc_comment.unwrap().module.as_deref(), Some("Kit"));

        let conformance = &graph.relationships[0];
        assert_eq!(conformance.kind, RelationshipKind::ConformsTo);
        assert_eq!(conformance.target_fallback.as_deref(), Some("Swift.Equatable"));
        assert_eq!(conformance.swift_constraints[0].kind, ConstraintKind::SameType);
    }

    #[test]
    fn unknown_relationship_kinds_are_tolerated() {
        let graph = SymbolGraph::parse(GRAPH).unwrap();
        assert_eq!(graph.relationships[1].kind, RelationshipKind::Other);
    }

    #[test]
    fn discover_finds_graphs_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("Kit.symbols.json"), GRAPH).unwrap();
        std::fs::write(dir.path().join("nested/Kit@Swift.symbols.json"), GRAPH).unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let found = discover(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn discover_reports_missing_and_empty_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(discover(&[dir.path().to_path_buf()]), Err(Error::NoSymbolGraphs { .. })));
        assert!(matches!(discover(&[dir.path().join("missing.symbols.json")]), Err(Error::FileNotFound { .. })));
    }
}
