//! Numeric error classification.
//!
//! Codes map to a [`Coder`]: an HTTP-style status plus a message that is safe
//! to show outside the process. Codes `0..=100` are reserved; code `1` is the
//! unknown sentinel every unclassified error falls back to.

pub mod catalog;
pub mod coder;
pub mod registry;

pub use catalog::{CatalogError, CodeCatalog};
pub use coder::{Coder, DEFAULT_STATUS, RESERVED_CODES, UNKNOWN_CODE};
pub use registry::{
    global, is_code, must_register, parse_coder, register, CodeRegistry, RegistryError,
};
