//! Formatted variants of the constructors.
//!
//! Macros expand at the call site, so the captured location is the macro
//! invocation.

/// Creates a leaf [`Error`](crate::Error) from format arguments.
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)*) => {
        $crate::Error::new(::std::format!($($arg)*))
    };
}

/// [`wrap`](crate::wrap) with a formatted message.
#[macro_export]
macro_rules! wrapf {
    ($err:expr, $($arg:tt)*) => {
        $crate::wrap($err, ::std::format!($($arg)*))
    };
}

/// [`with_message`](crate::with_message) with a formatted message.
#[macro_export]
macro_rules! with_messagef {
    ($err:expr, $($arg:tt)*) => {
        $crate::with_message($err, ::std::format!($($arg)*))
    };
}

/// Creates a coded leaf [`Error`](crate::Error) from format arguments.
#[macro_export]
macro_rules! codef {
    ($code:expr, $($arg:tt)*) => {
        $crate::Error::coded($code, ::std::format!($($arg)*))
    };
}

/// [`with_code`](crate::with_code) with a formatted message.
#[macro_export]
macro_rules! with_codef {
    ($err:expr, $code:expr, $($arg:tt)*) => {
        $crate::with_code($err, $code, ::std::format!($($arg)*))
    };
}
