//! Authored link parsing: components, disambiguation suffixes, and the byte
//! ranges solutions point back into.

use std::ops::Range;

use crate::hasher::is_valid_hash;
use crate::types::{SourceLanguage, SymbolKind};

/// Suffix that narrows a path component to one of several colliding symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disambiguation {
    /// Hash part, as in `-1m96o`.
    pub hash: Option<String>,
    /// Kind part, without any language prefix.
    pub kind: Option<String>,
    /// Language named by a `swift.` or `objc.` kind prefix.
    pub language: Option<SourceLanguage>,
    /// Range of the suffix in the authored link, leading dash included.
    pub range: Range<usize>,
    /// Suffix text without the leading dash.
    pub text: String,
}

/// A parsed link: components in order, and whether it starts at the modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    /// Non-empty list of components.
    components: Vec<PathComponent>,
    /// Whether the link names a module first.
    is_absolute: bool,
}

impl ParsedLink {
    /// Components in order. Never empty.
    pub fn components(&self) -> &[PathComponent] {
        return &self.components;
    }

    /// Whether the link names a module first.
    pub const fn is_absolute(&self) -> bool {
        return self.is_absolute;
    }
}

/// One `/`-separated segment of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponent {
    /// Parsed suffix, if the segment has one.
    pub disambiguation: Option<Disambiguation>,
    /// Whole segment with escapes removed.
    pub full: String,
    /// Spelling without the suffix, escapes removed.
    pub name: String,
    /// Range of the spelling in the authored link.
    pub name_range: Range<usize>,
    /// Range of the whole segment in the authored link.
    pub range: Range<usize>,
}

impl PathComponent {
    /// Parse one raw segment that starts at byte `offset` of the authored link.
    ///
    /// The segment splits on its last unescaped `-`. The part after it is a
    /// suffix when it is a known kind (optionally `swift.`/`objc.` prefixed)
    /// or a hash; a hash may itself be preceded by `-<kind>`. Anything else
    /// is part of the spelling.
    pub fn parse(raw: &str, offset: usize) -> Self {
        let range = offset..offset.saturating_add(raw.len());
        let Some(dash) = last_unescaped_dash(raw) else {
            return Self::plain(raw, range);
        };
        let (Some(name_raw), Some(suffix)) = (raw.get(..dash), raw.get(dash.saturating_add(1)..)) else {
            return Self::plain(raw, range);
        };
        if name_raw.is_empty() {
            return Self::plain(raw, range);
        }

        if let Some((language, kind)) = parse_kind(suffix) {
            return Self {
                disambiguation: Some(Disambiguation {
                    hash: None,
                    kind: Some(kind),
                    language,
                    range: offset.saturating_add(dash)..range.end,
                    text: suffix.to_string(),
                }),
                full: unescape(raw),
                name: unescape(name_raw),
                name_range: offset..offset.saturating_add(dash),
                range,
            };
        }

        if !is_valid_hash(suffix) {
            return Self::plain(raw, range);
        }

        // `<name>-<kind>-<hash>`
        let kind_and_name = last_unescaped_dash(name_raw).and_then(|kind_dash| {
            let kind = parse_kind(name_raw.get(kind_dash.saturating_add(1)..)?)?;
            let name = name_raw.get(..kind_dash).filter(|name| return !name.is_empty())?;
            return Some((kind_dash, kind, name));
        });
        if let Some((kind_dash, (language, kind), name)) = kind_and_name {
            return Self {
                disambiguation: Some(Disambiguation {
                    hash: Some(suffix.to_string()),
                    kind: Some(kind),
                    language,
                    range: offset.saturating_add(kind_dash)..range.end,
                    text: raw.get(kind_dash.saturating_add(1)..).unwrap_or(suffix).to_string(),
                }),
                full: unescape(raw),
                name: unescape(name),
                name_range: offset..offset.saturating_add(kind_dash),
                range,
            };
        }

        return Self {
            disambiguation: Some(Disambiguation {
                hash: Some(suffix.to_string()),
                kind: None,
                language: None,
                range: offset.saturating_add(dash)..range.end,
                text: suffix.to_string(),
            }),
            full: unescape(raw),
            name: unescape(name_raw),
            name_range: offset..offset.saturating_add(dash),
            range,
        };
    }

    /// A segment with no suffix.
    fn plain(raw: &str, range: Range<usize>) -> Self {
        let full = unescape(raw);
        return Self {
            disambiguation: None,
            name: full.clone(),
            full,
            name_range: range.clone(),
            range,
        };
    }
}

/// Byte offset of the last `-` not preceded by a backslash.
fn last_unescaped_dash(raw: &str) -> Option<usize> {
    let mut found = None;
    let mut escaped = false;
    for (index, byte) in raw.bytes().enumerate() {
        if byte == b'-' && !escaped {
            found = Some(index);
        }
        escaped = byte == b'\\' && !escaped;
    }
    return found;
}

/// Parse a link syntax string into components.
///
/// Accepts `doc://<bundle>/...` and `doc:` prefixes, absolute (`/Module/...`)
/// and relative paths, and a leading `documentation` component, which is
/// skipped. A `#fragment` is ignored. Component ranges are byte offsets into
/// `authored`, prefixes included.
///
/// # Errors
///
/// Returns a description of the problem when the link has no path components.
pub fn parse_link(authored: &str) -> Result<ParsedLink, String> {
    let (path_start, has_scheme_host) = if let Some(rest) = authored.strip_prefix("doc://") {
        let Some(host_len) = rest.find('/') else {
            return Err(format!("'{authored}' has no path after the bundle identifier"));
        };
        ("doc://".len().saturating_add(host_len), true)
    } else if authored.starts_with("doc:") {
        ("doc:".len(), false)
    } else {
        (0, false)
    };

    let tail = authored.get(path_start..).unwrap_or_default();
    let path = tail.split('#').next().unwrap_or_default();
    let is_absolute = has_scheme_host || path.starts_with('/');

    let mut components = Vec::new();
    let mut cursor = path_start;
    for segment in path.split('/') {
        if !segment.is_empty() {
            components.push(PathComponent::parse(segment, cursor));
        }
        cursor = cursor.saturating_add(segment.len()).saturating_add(1);
    }

    let starts_with_documentation = components.first().is_some_and(|c| return c.full == "documentation");
    if is_absolute && starts_with_documentation && components.len() > 1 {
        components.remove(0);
    }

    if components.is_empty() {
        return Err(format!("'{authored}' has no path components"));
    }
    return Ok(ParsedLink { components, is_absolute });
}

/// Recognize a kind suffix, optionally language-prefixed.
fn parse_kind(text: &str) -> Option<(Option<SourceLanguage>, String)> {
    if SymbolKind::known(text).is_some() {
        return Some((None, text.to_string()));
    }
    let (tag, kind) = text.split_once('.')?;
    let language = SourceLanguage::from_link_tag(tag)?;
    SymbolKind::known(kind)?;
    return Some((Some(language), kind.to_string()));
}

/// Remove `\` escapes in front of dashes.
fn unescape(raw: &str) -> String {
    return raw.replace("\\-", "-");
}
