use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the project config file.
pub const CONFIG_FILE: &str = ".symref.toml";

/// Bundle identifier used when neither the config nor the command line names one.
pub const DEFAULT_BUNDLE_ID: &str = "org.example.documentation";

/// Project configuration loaded from `.symref.toml`.
/// Command-line flags take precedence over every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Bundle the generated references point into.
    pub bundle_id: Option<String>,
    /// Keep documentation that members inherit from other modules.
    pub inherit_docs: bool,
    /// Symbol graph files or directories, relative to the config's directory.
    pub symbol_graphs: Vec<PathBuf>,
}

/// Raw TOML structure for `.symref.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SymrefTomlConfig {
    /// Bundle identifier.
    #[serde(default)]
    bundle_id: Option<String>,
    /// Inherit documentation from other modules.
    #[serde(default)]
    inherit_docs: bool,
    /// Symbol graph paths.
    #[serde(default)]
    symbol_graphs: Vec<PathBuf>,
}

impl Config {
    /// Bundle identifier, falling back to [`DEFAULT_BUNDLE_ID`].
    pub fn bundle_id(&self) -> &str {
        return self.bundle_id.as_deref().unwrap_or(DEFAULT_BUNDLE_ID);
    }

    /// Load config from `.symref.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config file the
    /// user wrote is never silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content, root);
    }

    /// Load an explicitly named config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        let root = path.parent().unwrap_or_else(|| return Path::new("."));
        return Self::parse(&content, root);
    }

    /// Parse TOML, resolving relative graph paths against `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    fn parse(content: &str, root: &Path) -> Result<Self, Error> {
        let raw: SymrefTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            bundle_id: raw.bundle_id,
            inherit_docs: raw.inherit_docs,
            symbol_graphs: raw.symbol_graphs.into_iter().map(|p| return root.join(p)).collect(),
        });
    }
}
