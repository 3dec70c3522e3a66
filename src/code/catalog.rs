//! Code catalogs loaded from configuration files.
//!
//! A catalog lists the codes an application registers at startup:
//!
//! ```toml
//! strict = true
//!
//! [codes.user_not_found]
//! code = 110001
//! status = 404
//! message = "User not found"
//! ```
//!
//! Values can be overridden from the environment with the `FAULTLINE` prefix and
//! `__` as separator, e.g. `FAULTLINE__CODES__USER_NOT_FOUND__STATUS=410`.

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use super::coder::Coder;
use super::registry::{CodeRegistry, RegistryError};

/// Environment variable prefix for catalog overrides.
pub const ENV_PREFIX: &str = "FAULTLINE";

/// Errors that can occur when loading or applying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file was not found.
    #[error("catalog file not found: {0}")]
    FileNotFound(String),

    /// The catalog path is not valid UTF-8.
    #[error("invalid catalog path: {0}")]
    InvalidPath(String),

    /// The catalog could not be parsed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] ConfigError),

    /// An entry was rejected by the registry.
    #[error("cannot register '{name}': {source}")]
    Registry {
        name: String,
        #[source]
        source: RegistryError,
    },
}

/// Deserialized catalog contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeCatalog {
    /// Reject codes that are already registered instead of overwriting them.
    #[serde(default)]
    pub strict: bool,
    /// Entries by name, in name order.
    #[serde(default)]
    pub codes: BTreeMap<String, Coder>,
}

impl CodeCatalog {
    /// Loads a catalog file, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid, the file does not exist, or
    /// its contents do not describe a catalog.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| CatalogError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(CatalogError::FileNotFound(path_str.to_string()));
        }

        Self::build(File::with_name(path_str))
    }

    /// Parses catalog contents from a TOML string, applying environment overrides.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        Self::build(File::from_str(contents, FileFormat::Toml))
    }

    fn build<S>(source: S) -> Result<Self, CatalogError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl CodeRegistry {
    /// Registers every entry of `catalog`, returning how many were registered.
    ///
    /// Strict catalogs reject codes that are already taken; others overwrite.
    /// A rejected entry leaves the registry untouched.
    pub fn load_catalog(&self, catalog: &CodeCatalog) -> Result<usize, CatalogError> {
        let coders: Vec<Coder> = catalog.codes.values().cloned().collect();
        self.register_all(&coders, catalog.strict)
            .map_err(|(position, source)| CatalogError::Registry {
                name: catalog.codes.keys().nth(position).cloned().unwrap_or_default(),
                source,
            })?;

        tracing::info!(
            codes = catalog.len(),
            strict = catalog.strict,
            "loaded error code catalog"
        );
        Ok(catalog.len())
    }
}
