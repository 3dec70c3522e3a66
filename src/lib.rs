//! Faultline - error chains with call-site traces, numeric codes and aggregation.
//!
//! Errors are built as immutable chains of nodes. Each node either records a
//! message, a stack, a prefix message or a numeric classification code:
//!
//! ```
//! use faultline::{is, with_code, wrap, Error};
//!
//! let not_found = Error::new("record not found");
//! let err = wrap(Some(not_found.clone()), "loading profile").unwrap();
//! let err = with_code(Some(err), 110001, "user lookup failed").unwrap();
//!
//! assert!(is(&err, &not_found));
//! assert_eq!(err.to_string(), "user lookup failed");
//! ```
//!
//! Codes are described by a [`Coder`] in a [`CodeRegistry`]; rendering looks
//! them up to show external messages. Several independent errors can be
//! collected into an [`Aggregate`], including from concurrent work.

pub mod aggregate;
pub mod chain;
pub mod code;
pub mod format;
pub mod logging;
pub mod trace;

pub use aggregate::{
    aggregate_parallel, aggregate_threads, filter_out, flatten, register_group, Aggregate,
    ErrorGroup, Matcher,
};
pub use chain::{
    cause, chain, find, is, unwrap, with_code, with_message, with_stack, wrap, AsDynError,
    DynError, Error, ErrorNode, ResultExt,
};
pub use code::{
    is_code, must_register, parse_coder, register, CodeCatalog, CodeRegistry, Coder,
    RegistryError,
};
pub use format::Render;
