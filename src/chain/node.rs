//! The chain node type and the [`Error`] handle.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::format::Render;
use crate::trace::CapturedTrace;

/// Shared, type-erased error used for causes and aggregate members.
pub type DynError = Arc<dyn StdError + Send + Sync + 'static>;

/// One link in an error chain.
///
/// The set of variants is closed: every constructor in this crate produces
/// exactly one of them, and nodes are never modified after construction.
#[derive(Debug)]
pub enum ErrorNode {
    /// Leaf error with a message and the stack where it was created.
    Fundamental {
        message: String,
        trace: CapturedTrace,
    },
    /// Adds location metadata to a cause, nothing else.
    Stacked { cause: DynError, trace: CapturedTrace },
    /// Prepends a message to a cause. No trace is captured.
    Messaged { cause: DynError, message: String },
    /// Carries a numeric classification code, optionally on top of a cause.
    Coded {
        message: String,
        code: i32,
        cause: Option<DynError>,
        trace: CapturedTrace,
    },
}

/// Handle to an immutable chain node.
///
/// Cloning is cheap and clones compare equal: equality is node identity, so an
/// error created once and stored in a `static` or a field works as a sentinel
/// for [`is`](crate::chain::is).
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorNode>,
}

impl Error {
    pub(crate) fn from_node(node: ErrorNode) -> Self {
        Self {
            inner: Arc::new(node),
        }
    }

    /// Creates a leaf error and records the caller's stack.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_node(ErrorNode::Fundamental {
            message: message.into(),
            trace: CapturedTrace::capture(),
        })
    }

    /// Creates a classified leaf error with no cause.
    #[track_caller]
    pub fn coded(code: i32, message: impl Into<String>) -> Self {
        Self::from_node(ErrorNode::Coded {
            message: message.into(),
            code,
            cause: None,
            trace: CapturedTrace::capture(),
        })
    }

    /// The underlying node, for exhaustive matching.
    pub fn node(&self) -> &ErrorNode {
        &self.inner
    }

    /// The classification code, if this node is coded.
    pub fn code(&self) -> Option<i32> {
        match self.node() {
            ErrorNode::Coded { code, .. } => Some(*code),
            ErrorNode::Fundamental { .. }
            | ErrorNode::Stacked { .. }
            | ErrorNode::Messaged { .. } => None,
        }
    }

    /// The message stored on this node. `Stacked` nodes carry none.
    pub fn message(&self) -> Option<&str> {
        match self.node() {
            ErrorNode::Fundamental { message, .. }
            | ErrorNode::Messaged { message, .. }
            | ErrorNode::Coded { message, .. } => Some(message),
            ErrorNode::Stacked { .. } => None,
        }
    }

    /// The stack captured when this node was built. `Messaged` nodes carry none.
    pub fn trace(&self) -> Option<&CapturedTrace> {
        match self.node() {
            ErrorNode::Fundamental { trace, .. }
            | ErrorNode::Stacked { trace, .. }
            | ErrorNode::Coded { trace, .. } => Some(trace),
            ErrorNode::Messaged { .. } => None,
        }
    }

    /// The direct cause of this node, if any.
    pub fn direct_cause(&self) -> Option<&DynError> {
        match self.node() {
            ErrorNode::Stacked { cause, .. } | ErrorNode::Messaged { cause, .. } => Some(cause),
            ErrorNode::Coded { cause, .. } => cause.as_ref(),
            ErrorNode::Fundamental { .. } => None,
        }
    }

    /// The innermost error reachable through direct causes.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        crate::chain::cause(Some(self)).unwrap_or(self)
    }

    /// Renders this error through the process-wide registry.
    pub fn render(&self) -> Render<'_> {
        Render::new(self)
    }

    /// Converts into the shared form used by causes and aggregates.
    pub fn into_dyn(self) -> DynError {
        Arc::new(self)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}

/// `{}` is the short message. Format flags select richer output:
/// `{:-}` detail, `{:+}` full trace, `{:#}` JSON (combinable with `-` or `+`).
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() || f.sign_plus() || f.sign_minus() {
            let rendered = Render::new(self)
                .detail(f.sign_minus())
                .trace(f.sign_plus())
                .json(f.alternate())
                .to_string();
            return f.write_str(&rendered);
        }

        match self.node() {
            ErrorNode::Fundamental { message, .. } | ErrorNode::Coded { message, .. } => {
                f.write_str(message)
            }
            ErrorNode::Stacked { cause, .. } => write!(f, "{}", cause),
            ErrorNode::Messaged { cause, message } => write!(f, "{}: {}", message, cause),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.direct_cause() {
            Some(cause) => Some(&**cause),
            None => None,
        }
    }
}

/// Converts any error into a [`DynError`] without stacking `Arc` layers.
pub(crate) fn into_dyn<E>(err: E) -> DynError
where
    E: StdError + Send + Sync + 'static,
{
    let boxed: Box<dyn StdError + Send + Sync> = Box::new(err);
    match boxed.downcast::<DynError>() {
        Ok(shared) => *shared,
        Err(boxed) => Arc::from(boxed),
    }
}

/// Borrow any error, sized or not, as a `'static` trait object.
pub trait AsDynError {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static);
}

impl<T: StdError + 'static> AsDynError for T {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl AsDynError for dyn StdError + 'static {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl AsDynError for dyn StdError + Send + Sync + 'static {
    fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}
