//! Classification metadata attached to a numeric error code.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize, Serializer};

/// Codes reserved for this crate's own sentinels.
pub const RESERVED_CODES: RangeInclusive<i32> = 0..=100;

/// Code of the sentinel applied when no registered classification is found.
pub const UNKNOWN_CODE: i32 = 1;

/// Status reported when a coder has none.
pub const DEFAULT_STATUS: u16 = 500;

/// Immutable description of an error code: HTTP-style status and the message
/// that is safe to show outside the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coder {
    code: i32,
    #[serde(default, serialize_with = "serialize_status")]
    status: u16,
    #[serde(default)]
    message: String,
}

impl Coder {
    pub fn new(code: i32, status: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    /// The sentinel used for unclassified errors.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CODE, DEFAULT_STATUS, "Internal server error")
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// The associated status, 500 when none was given.
    pub fn http_status(&self) -> u16 {
        effective_status(self.status)
    }

    /// External, user-facing message. May be empty.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_CODES.contains(&self.code)
    }
}

impl fmt::Display for Coder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn effective_status(status: u16) -> u16 {
    if status == 0 {
        DEFAULT_STATUS
    } else {
        status
    }
}

fn serialize_status<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(effective_status(*status))
}
