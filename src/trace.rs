//! Call-site and call-stack capture for chain nodes.
//!
//! A [`CapturedTrace`] is taken once, when an error node is constructed, and is
//! never modified afterwards. Capturing is cheap: the call site comes from
//! `#[track_caller]` and the backtrace is recorded unresolved. Symbol
//! resolution happens the first time a renderer asks for frames.

use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use backtrace::Backtrace;

/// Placeholder used when a frame's file or function cannot be resolved.
pub const UNKNOWN_SYMBOL: &str = "unknown";

/// One call-stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    /// Source file of the frame.
    pub file: String,
    /// Line number within `file`.
    pub line: u32,
    /// Demangled function or symbol name.
    pub function: String,
}

impl LocationRecord {
    fn from_symbol(symbol: &backtrace::BacktraceSymbol) -> Self {
        Self {
            file: symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
            line: symbol.lineno().unwrap_or(0),
            function: symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
        }
    }

    fn is_call_site(&self, call_site: &Location<'_>) -> bool {
        self.line == call_site.line() && Path::new(&self.file).ends_with(call_site.file())
    }
}

impl fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// Immutable snapshot of the call stack at error construction time.
pub struct CapturedTrace {
    call_site: &'static Location<'static>,
    backtrace: Mutex<Option<Backtrace>>,
    resolved: OnceLock<Vec<LocationRecord>>,
}

impl CapturedTrace {
    /// Captures the stack of the caller.
    ///
    /// Every function between the public constructor and this call must carry
    /// `#[track_caller]`, otherwise the recorded call site points into this crate.
    #[track_caller]
    pub fn capture() -> Self {
        Self {
            call_site: Location::caller(),
            backtrace: Mutex::new(Some(Backtrace::new_unresolved())),
            resolved: OnceLock::new(),
        }
    }

    /// The location that constructed the error, as reported by the compiler.
    pub fn call_site(&self) -> &'static Location<'static> {
        self.call_site
    }

    /// The frame to show as "caller" in rendered output.
    ///
    /// File and line always come from the call site; the function name is looked
    /// up in the resolved backtrace and falls back to [`UNKNOWN_SYMBOL`].
    pub fn caller(&self) -> LocationRecord {
        let function = self
            .records()
            .first()
            .filter(|record| record.is_call_site(self.call_site))
            .map(|record| record.function.clone())
            .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string());

        LocationRecord {
            file: self.call_site.file().to_string(),
            line: self.call_site.line(),
            function,
        }
    }

    /// All frames, innermost first.
    ///
    /// When the call site is found in the backtrace, frames belonging to the
    /// capture machinery above it are dropped so the list starts at the call site.
    pub fn records(&self) -> &[LocationRecord] {
        self.resolved.get_or_init(|| {
            let taken = self
                .backtrace
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            let Some(mut backtrace) = taken else {
                return Vec::new();
            };
            backtrace.resolve();

            let records: Vec<LocationRecord> = backtrace
                .frames()
                .iter()
                .flat_map(|frame| frame.symbols())
                .map(LocationRecord::from_symbol)
                .collect();

            match records
                .iter()
                .position(|record| record.is_call_site(self.call_site))
            {
                Some(start) => records[start..].to_vec(),
                None => records,
            }
        })
    }
}

impl fmt::Debug for CapturedTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedTrace")
            .field("call_site", &self.call_site)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

/// Stack dump, one frame per entry: the function, then the indented location.
impl fmt::Display for CapturedTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.records();
        if records.is_empty() {
            return write!(
                f,
                "{}\n\t{}:{}",
                UNKNOWN_SYMBOL,
                self.call_site.file(),
                self.call_site.line()
            );
        }
        for (index, record) in records.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}\n\t{}:{}", record.function, record.file, record.line)?;
        }
        Ok(())
    }
}
