//! Error chain model.
//!
//! Errors are built from four node kinds (see [`ErrorNode`]) that link to a
//! cause. Constructors are nil-safe: wrapping `None` yields `None`. Chains are
//! walked with the standard `source()` relation, so foreign errors take part in
//! [`is`], [`find`] and rendering like any node built here.

mod construct;
mod ext;
mod inspect;
mod macros;
mod node;

pub use construct::{with_code, with_message, with_stack, wrap};
pub use ext::ResultExt;
pub use inspect::{cause, chain, find, is, unwrap, Chain};
pub use node::{AsDynError, DynError, Error, ErrorNode};

pub(crate) use inspect::peel;
pub(crate) use node::into_dyn;
