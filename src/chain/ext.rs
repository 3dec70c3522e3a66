//! Annotation methods on `Result`.
//!
//! The `Ok` path never builds an error or captures a stack.

use std::error::Error as StdError;

use super::construct::{code_dyn, message_dyn, stack_dyn, wrap_dyn};
use super::node::{into_dyn, Error};

/// Extension trait bringing the wrapping constructors to `Result`.
pub trait ResultExt<T> {
    /// See [`with_stack`](crate::chain::with_stack).
    fn with_stack(self) -> Result<T, Error>;

    /// See [`wrap`](crate::chain::wrap).
    fn wrap(self, message: impl Into<String>) -> Result<T, Error>;

    /// Like [`wrap`](ResultExt::wrap), building the message only on error.
    fn wrap_with<M, F>(self, message: F) -> Result<T, Error>
    where
        M: Into<String>,
        F: FnOnce() -> M;

    /// See [`with_message`](crate::chain::with_message).
    fn with_message(self, message: impl Into<String>) -> Result<T, Error>;

    /// See [`with_code`](crate::chain::with_code).
    fn with_code(self, code: i32, message: impl Into<String>) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn with_stack(self) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(stack_dyn(into_dyn(err))),
        }
    }

    #[track_caller]
    fn wrap(self, message: impl Into<String>) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(wrap_dyn(into_dyn(err), message.into())),
        }
    }

    #[track_caller]
    fn wrap_with<M, F>(self, message: F) -> Result<T, Error>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(wrap_dyn(into_dyn(err), message().into())),
        }
    }

    fn with_message(self, message: impl Into<String>) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(message_dyn(into_dyn(err), message.into())),
        }
    }

    #[track_caller]
    fn with_code(self, code: i32, message: impl Into<String>) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(code_dyn(into_dyn(err), code, message.into())),
        }
    }
}
