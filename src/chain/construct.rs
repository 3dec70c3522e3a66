//! Wrapping constructors.
//!
//! Each function takes the error to annotate as an `Option` and returns `None`
//! when given `None`, so "no error" passes through untouched.

use std::error::Error as StdError;

use super::node::{into_dyn, DynError, Error, ErrorNode};
use crate::trace::CapturedTrace;

/// Attaches the caller's stack to `err`.
///
/// A coded error keeps its classification: the result is a new coded node with
/// the same code and message whose cause is `err`.
#[track_caller]
pub fn with_stack<E>(err: Option<E>) -> Option<Error>
where
    E: StdError + Send + Sync + 'static,
{
    let err = err?;
    Some(stack_dyn(into_dyn(err)))
}

/// Annotates `err` with a message and the caller's stack.
///
/// On a coded error the message is replaced and the code kept; otherwise the
/// result is a stacked node around a messaged node.
#[track_caller]
pub fn wrap<E>(err: Option<E>, message: impl Into<String>) -> Option<Error>
where
    E: StdError + Send + Sync + 'static,
{
    let err = err?;
    Some(wrap_dyn(into_dyn(err), message.into()))
}

/// Prepends a message to `err` without capturing a stack.
pub fn with_message<E>(err: Option<E>, message: impl Into<String>) -> Option<Error>
where
    E: StdError + Send + Sync + 'static,
{
    let err = err?;
    Some(message_dyn(into_dyn(err), message.into()))
}

/// Layers a new classification on top of `err`, whatever its variant.
#[track_caller]
pub fn with_code<E>(err: Option<E>, code: i32, message: impl Into<String>) -> Option<Error>
where
    E: StdError + Send + Sync + 'static,
{
    let err = err?;
    Some(code_dyn(into_dyn(err), code, message.into()))
}

fn coded_parts(err: &DynError) -> Option<(i32, &str)> {
    match err.downcast_ref::<Error>()?.node() {
        ErrorNode::Coded { code, message, .. } => Some((*code, message.as_str())),
        ErrorNode::Fundamental { .. } | ErrorNode::Stacked { .. } | ErrorNode::Messaged { .. } => {
            None
        }
    }
}

#[track_caller]
pub(crate) fn stack_dyn(err: DynError) -> Error {
    if let Some((code, message)) = coded_parts(&err) {
        let message = message.to_string();
        return code_dyn(err, code, message);
    }
    Error::from_node(ErrorNode::Stacked {
        cause: err,
        trace: CapturedTrace::capture(),
    })
}

#[track_caller]
pub(crate) fn wrap_dyn(err: DynError, message: String) -> Error {
    if let Some((code, _)) = coded_parts(&err) {
        return code_dyn(err, code, message);
    }
    let messaged = message_dyn(err, message);
    Error::from_node(ErrorNode::Stacked {
        cause: messaged.into_dyn(),
        trace: CapturedTrace::capture(),
    })
}

pub(crate) fn message_dyn(err: DynError, message: String) -> Error {
    Error::from_node(ErrorNode::Messaged {
        cause: err,
        message,
    })
}

#[track_caller]
pub(crate) fn code_dyn(err: DynError, code: i32, message: String) -> Error {
    Error::from_node(ErrorNode::Coded {
        message,
        code,
        cause: Some(err),
        trace: CapturedTrace::capture(),
    })
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_wrappers_pass_none_through() {
        assert!(with_stack(None::<Error>).is_none());
        assert!(wrap(None::<Error>, "ctx").is_none());
        assert!(with_message(None::<io::Error>, "ctx").is_none());
        assert!(with_code(None::<Error>, 200001, "ctx").is_none());
    }

    #[test]
    fn test_with_stack_on_plain_error_is_stacked() {
        let err = with_stack(Some(Error::new("root"))).unwrap();
        assert!(matches!(err.node(), ErrorNode::Stacked { .. }));
        assert_eq!(err.to_string(), "root");
    }

    #[test]
    fn test_with_stack_on_coded_error_keeps_code() {
        let inner = Error::coded(200002, "db down");
        let err = with_stack(Some(inner.clone())).unwrap();

        assert_eq!(err.code(), Some(200002));
        assert_eq!(err.to_string(), "db down");
        let cause = err.direct_cause().unwrap().downcast_ref::<Error>().unwrap();
        assert_eq!(cause, &inner);
    }

    #[test]
    fn test_wrap_plain_error_nests_message_inside_stack() {
        let err = wrap(Some(Error::new("eof")), "read config").unwrap();
        assert_eq!(err.to_string(), "read config: eof");

        let ErrorNode::Stacked { cause, .. } = err.node() else {
            panic!("expected stacked node, got {:?}", err.node());
        };
        let messaged = cause.downcast_ref::<Error>().unwrap();
        assert!(matches!(messaged.node(), ErrorNode::Messaged { .. }));
        assert!(messaged.trace().is_none());
    }

    #[test]
    fn test_wrap_coded_error_rebases_message() {
        let err = wrap(Some(Error::coded(200003, "low level")), "high level").unwrap();
        assert_eq!(err.code(), Some(200003));
        assert_eq!(err.to_string(), "high level");
    }

    #[test]
    fn test_with_message_on_foreign_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = with_message(Some(io_err), "open settings").unwrap();
        assert_eq!(err.to_string(), "open settings: no such file");
        assert!(err.trace().is_none());
    }

    #[test]
    fn test_with_code_layers_over_any_variant() {
        let base = with_message(Some(Error::new("x")), "y").unwrap();
        let err = with_code(Some(base), 200004, "classified").unwrap();
        assert_eq!(err.code(), Some(200004));
        assert_eq!(err.to_string(), "classified");
        assert!(err.direct_cause().is_some());
    }
}
