/// Core domain types for symref: languages, kinds, selectors, and references.
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a generic constraint relates its two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `lhs: rhs` where `rhs` is a protocol.
    #[serde(rename = "conformance")]
    Conformance,
    /// `lhs == rhs`.
    #[serde(rename = "sameType")]
    SameType,
    /// `lhs: rhs` where `rhs` is a class.
    #[serde(rename = "superclass")]
    Superclass,
}

/// A single `where` clause requirement, as it appears in `swiftConstraints`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenericConstraint {
    /// Relation between the two sides.
    pub kind: ConstraintKind,
    /// Constrained type, usually a generic parameter or `Self`.
    pub lhs: String,
    /// Constraining type.
    pub rhs: String,
}

/// A reference to a documented page inside a bundle.
///
/// Two references are the same page exactly when their absolute strings match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReference {
    /// Identifier of the documentation bundle that owns the page.
    pub bundle_id: String,
    /// Interface language the page is presented in.
    pub language: SourceLanguage,
    /// URL path, always starting with `/documentation/`.
    pub path: String,
}

impl ResolvedReference {
    /// The `doc://<bundle>/documentation/...` form of this reference.
    pub fn absolute_string(&self) -> String {
        return format!("doc://{}{}", self.bundle_id, self.path);
    }
}

impl fmt::Display for ResolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "doc://{}{}", self.bundle_id, self.path);
    }
}

/// Distinguishes symbol graphs of one module built for different interface
/// languages or platforms. Relationship sets are stored per selector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector {
    /// Language the symbol graph was extracted for.
    pub interface_language: SourceLanguage,
    /// Target operating system, if the graph names one.
    pub platform: Option<String>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match &self.platform {
            Some(platform) => write!(f, "{}@{platform}", self.interface_language.identifier()),
            None => write!(f, "{}", self.interface_language.identifier()),
        };
    }
}

impl Serialize for Selector {
    /// Selectors key JSON maps, so they serialize as their display string.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.collect_str(self);
    }
}

/// Interface language of a symbol or of one of its path spellings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceLanguage {
    /// Objective-C (and C, which shares its symbol graphs).
    ObjectiveC,
    /// Any other language identifier, kept verbatim.
    Other(String),
    /// Swift.
    Swift,
}

impl SourceLanguage {
    /// Parse a symbol graph `interfaceLanguage` or a link language tag.
    pub fn from_identifier(identifier: &str) -> Self {
        return match identifier {
            "swift" => Self::Swift,
            "occ" | "objc" | "objective-c" | "c" => Self::ObjectiveC,
            other => Self::Other(other.to_string()),
        };
    }

    /// Stable identifier written to snapshots and summaries.
    pub fn identifier(&self) -> &str {
        return match self {
            Self::ObjectiveC => "occ",
            Self::Other(identifier) => identifier,
            Self::Swift => "swift",
        };
    }

    /// Prefix used in link suffixes such as `-swift.enum.case`.
    pub fn link_tag(&self) -> &str {
        return match self {
            Self::ObjectiveC => "objc",
            Self::Other(identifier) => identifier,
            Self::Swift => "swift",
        };
    }

    /// Language named by a link suffix prefix. Only the two tags the link
    /// syntax defines are recognized.
    pub fn from_link_tag(tag: &str) -> Option<Self> {
        return match tag {
            "swift" => Some(Self::Swift),
            "objc" => Some(Self::ObjectiveC),
            _ => None,
        };
    }
}

impl From<String> for SourceLanguage {
    fn from(identifier: String) -> Self {
        return Self::from_identifier(&identifier);
    }
}

impl From<SourceLanguage> for String {
    fn from(language: SourceLanguage) -> Self {
        return language.identifier().to_string();
    }
}

/// Kind of a documented symbol. The identifier (without a language prefix)
/// doubles as the `-<kind>` link disambiguation suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymbolKind {
    AssociatedType,
    Class,
    Deinit,
    Enum,
    EnumCase,
    ExtendedClass,
    ExtendedEnum,
    ExtendedModule,
    ExtendedProtocol,
    ExtendedStruct,
    Extension,
    Func,
    Init,
    Ivar,
    Macro,
    Method,
    Module,
    Operator,
    /// A kind this crate has no special handling for, kept verbatim.
    Other(String),
    Property,
    Protocol,
    Struct,
    Subscript,
    TypeAlias,
    TypeMethod,
    TypeProperty,
    TypeSubscript,
    Var,
}

/// Language prefixes symbol graphs put in front of kind identifiers.
const KIND_LANGUAGE_PREFIXES: [&str; 5] = ["swift", "objc", "objective-c", "occ", "c"];

impl SymbolKind {
    /// Parse a symbol graph kind identifier such as `swift.enum.case`.
    pub fn from_identifier(identifier: &str) -> Self {
        let unprefixed = match identifier.split_once('.') {
            Some((prefix, rest)) if KIND_LANGUAGE_PREFIXES.contains(&prefix) => rest,
            _ => identifier,
        };
        return Self::known(unprefixed).unwrap_or_else(|| return Self::Other(unprefixed.to_string()));
    }

    /// The kind named by an unprefixed identifier, if it is one this crate
    /// knows. Link suffixes are only treated as kinds when this succeeds.
    pub fn known(identifier: &str) -> Option<Self> {
        let kind = match identifier {
            "associatedtype" => Self::AssociatedType,
            "class" => Self::Class,
            "class.extension" => Self::ExtendedClass,
            "deinit" => Self::Deinit,
            "enum" => Self::Enum,
            "enum.case" => Self::EnumCase,
            "enum.extension" => Self::ExtendedEnum,
            "extension" => Self::Extension,
            "func" => Self::Func,
            "func.op" => Self::Operator,
            "init" => Self::Init,
            "ivar" => Self::Ivar,
            "macro" => Self::Macro,
            "method" => Self::Method,
            "module" => Self::Module,
            "module.extension" => Self::ExtendedModule,
            "property" => Self::Property,
            "protocol" => Self::Protocol,
            "protocol.extension" => Self::ExtendedProtocol,
            "struct" => Self::Struct,
            "struct.extension" => Self::ExtendedStruct,
            "subscript" => Self::Subscript,
            "type.method" => Self::TypeMethod,
            "type.property" => Self::TypeProperty,
            "type.subscript" => Self::TypeSubscript,
            "typealias" => Self::TypeAlias,
            "var" => Self::Var,
            _ => return None,
        };
        return Some(kind);
    }

    /// Unprefixed identifier, as used in `-<kind>` link suffixes.
    pub fn identifier(&self) -> &str {
        return match self {
            Self::AssociatedType => "associatedtype",
            Self::Class => "class",
            Self::Deinit => "deinit",
            Self::Enum => "enum",
            Self::EnumCase => "enum.case",
            Self::ExtendedClass => "class.extension",
            Self::ExtendedEnum => "enum.extension",
            Self::ExtendedModule => "module.extension",
            Self::ExtendedProtocol => "protocol.extension",
            Self::ExtendedStruct => "struct.extension",
            Self::Extension => "extension",
            Self::Func => "func",
            Self::Init => "init",
            Self::Ivar => "ivar",
            Self::Macro => "macro",
            Self::Method => "method",
            Self::Module => "module",
            Self::Operator => "func.op",
            Self::Other(identifier) => identifier,
            Self::Property => "property",
            Self::Protocol => "protocol",
            Self::Struct => "struct",
            Self::Subscript => "subscript",
            Self::TypeAlias => "typealias",
            Self::TypeMethod => "type.method",
            Self::TypeProperty => "type.property",
            Self::TypeSubscript => "type.subscript",
            Self::Var => "var",
        };
    }
}

impl From<String> for SymbolKind {
    fn from(identifier: String) -> Self {
        return Self::from_identifier(&identifier);
    }
}

impl From<SymbolKind> for String {
    fn from(kind: SymbolKind) -> Self {
        return kind.identifier().to_string();
    }
}

/// The target of a relationship: either a symbol in this model or a
/// placeholder for one that isn't.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum TopicReference {
    /// A symbol present in the symbol store.
    Resolved {
        /// Precise identifier of the symbol.
        precise_id: String,
    },
    /// A symbol outside this model. Display names for these live in the
    /// owning section's fallback table.
    Unresolved(UnresolvedReference),
}

impl TopicReference {
    /// Precise identifier on either side of the union.
    pub fn precise_id(&self) -> &str {
        return match self {
            Self::Resolved { precise_id } => precise_id,
            Self::Unresolved(placeholder) => &placeholder.precise_id,
        };
    }

    /// Reference to a symbol known to be in the store.
    pub fn resolved(precise_id: &str) -> Self {
        return Self::Resolved { precise_id: precise_id.to_string() };
    }
}

/// Placeholder for a relationship target that can't be resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    /// Language the placeholder is presented in.
    pub language: SourceLanguage,
    /// `doc://` URL the target would have if it were documented here.
    pub path: String,
    /// Precise identifier of the missing target.
    pub precise_id: String,
}

impl UnresolvedReference {
    /// Build a placeholder for `precise_id`.
    ///
    /// Returns `None` when the identifier can't form a URL path: empty, or
    /// containing whitespace or control characters.
    pub fn placeholder(precise_id: &str, language: SourceLanguage, bundle_id: &str) -> Option<Self> {
        if precise_id.is_empty() || precise_id.chars().any(|c| return c.is_whitespace() || c.is_control()) {
            return None;
        }
        return Some(Self {
            language,
            path: format!("doc://{bundle_id}/documentation/{precise_id}"),
            precise_id: precise_id.to_string(),
        });
    }
}
