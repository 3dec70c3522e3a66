//! Code registry mapping numeric codes to [`Coder`] metadata.
//!
//! A registry is an ordinary value: applications build one at startup and pass
//! it where classification is needed, and tests use private instances. A
//! process-wide instance is also available through [`global`] for code that
//! renders errors without a handle.

use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::sync::{OnceLock, PoisonError, RwLock};

use thiserror::Error;

use super::coder::{Coder, RESERVED_CODES, UNKNOWN_CODE};
use crate::chain::{peel, AsDynError, Error as ChainError, ErrorNode};

/// Registry misuse. These are configuration mistakes, not runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The code lies in the range reserved for this crate.
    #[error("code {0} is reserved: codes {min}..={max} belong to faultline", min = RESERVED_CODES.start(), max = RESERVED_CODES.end())]
    Reserved(i32),

    /// The code is already registered and overwriting was not allowed.
    #[error("code {0} is already registered")]
    Duplicate(i32),
}

/// Thread-safe mapping from code to [`Coder`].
#[derive(Debug)]
pub struct CodeRegistry {
    codes: RwLock<HashMap<i32, Coder>>,
}

impl Default for CodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeRegistry {
    /// Creates a registry holding only the unknown sentinel.
    pub fn new() -> Self {
        let unknown = Coder::unknown();
        let mut codes = HashMap::new();
        codes.insert(unknown.code(), unknown);
        Self {
            codes: RwLock::new(codes),
        }
    }

    /// Registers `coder`, replacing any existing entry for its code.
    ///
    /// Returns the replaced entry.
    ///
    /// # Errors
    /// [`RegistryError::Reserved`] if the code is in `0..=100`.
    pub fn register(&self, coder: Coder) -> Result<Option<Coder>, RegistryError> {
        check_reserved(&coder)?;

        let code = coder.code();
        let status = coder.http_status();
        let previous = self
            .codes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code, coder);

        if previous.is_some() {
            tracing::warn!(code, status, "overwrote registered error code");
        } else {
            tracing::debug!(code, status, "registered error code");
        }
        Ok(previous)
    }

    /// Registers `coder` only if its code is free.
    ///
    /// # Errors
    /// [`RegistryError::Reserved`] for codes in `0..=100`,
    /// [`RegistryError::Duplicate`] when the code is already taken.
    pub fn register_unique(&self, coder: Coder) -> Result<(), RegistryError> {
        check_reserved(&coder)?;

        let code = coder.code();
        let status = coder.http_status();
        {
            let mut codes = self.codes.write().unwrap_or_else(PoisonError::into_inner);
            if codes.contains_key(&code) {
                return Err(RegistryError::Duplicate(code));
            }
            codes.insert(code, coder);
        }

        tracing::debug!(code, status, "registered error code");
        Ok(())
    }

    /// Registers every coder in `coders`, or none of them.
    ///
    /// All entries are checked before the first insert: reserved codes are
    /// always rejected, and with `unique` so are codes already registered or
    /// repeated within `coders`. A rejection reports the entry's position.
    pub(crate) fn register_all(
        &self,
        coders: &[Coder],
        unique: bool,
    ) -> Result<(), (usize, RegistryError)> {
        let mut codes = self.codes.write().unwrap_or_else(PoisonError::into_inner);

        let mut seen = HashSet::with_capacity(coders.len());
        for (position, coder) in coders.iter().enumerate() {
            check_reserved(coder).map_err(|err| (position, err))?;
            let code = coder.code();
            if unique && (codes.contains_key(&code) || !seen.insert(code)) {
                return Err((position, RegistryError::Duplicate(code)));
            }
        }

        for coder in coders {
            let code = coder.code();
            let status = coder.http_status();
            if codes.insert(code, coder.clone()).is_some() {
                tracing::warn!(code, status, "overwrote registered error code");
            } else {
                tracing::debug!(code, status, "registered error code");
            }
        }
        Ok(())
    }

    /// Startup-time registration that treats misuse as fatal.
    ///
    /// # Panics
    /// If the code is reserved or already registered.
    #[track_caller]
    pub fn must_register(&self, coder: Coder) {
        let code = coder.code();
        if let Err(err) = self.register_unique(coder) {
            tracing::error!(code, error = %err, "error code registration failed");
            panic!("{}", err);
        }
    }

    /// The coder registered for `code`, if any.
    pub fn get(&self, code: i32) -> Option<Coder> {
        self.codes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&code)
            .cloned()
    }

    /// The coder registered for `code`, or the unknown sentinel.
    pub fn lookup(&self, code: i32) -> Coder {
        self.get(code)
            .or_else(|| self.get(UNKNOWN_CODE))
            .unwrap_or_else(Coder::unknown)
    }

    pub fn contains(&self, code: i32) -> bool {
        self.codes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.codes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Always false: the unknown sentinel is registered on construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries, ordered by code.
    pub fn coders(&self) -> Vec<Coder> {
        let mut coders: Vec<Coder> = self
            .codes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        coders.sort_by_key(Coder::code);
        coders
    }

    /// Classifies an error.
    ///
    /// `None` yields `None`. A coded node resolves to its registered coder; an
    /// unregistered code and every other error resolve to the unknown sentinel.
    pub fn parse_coder<E>(&self, err: Option<&E>) -> Option<Coder>
    where
        E: AsDynError + ?Sized,
    {
        let err = peel(err?.as_dyn_error());
        let coder = match err.downcast_ref::<ChainError>().and_then(ChainError::code) {
            Some(code) => self.lookup(code),
            None => self.lookup(UNKNOWN_CODE),
        };
        Some(coder)
    }

    #[cfg(test)]
    pub(crate) fn insert_reserved(&self, coder: Coder) {
        self.codes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(coder.code(), coder);
    }
}

fn check_reserved(coder: &Coder) -> Result<(), RegistryError> {
    if coder.is_reserved() {
        return Err(RegistryError::Reserved(coder.code()));
    }
    Ok(())
}

/// Reports whether `err` is coded with `code`, looking through directly nested
/// coded causes only. The first non-coded node ends the search.
pub fn is_code<E>(err: &E, code: i32) -> bool
where
    E: AsDynError + ?Sized,
{
    let mut current: &(dyn StdError + 'static) = peel(err.as_dyn_error());
    loop {
        let Some(node) = current.downcast_ref::<ChainError>() else {
            return false;
        };
        match node.node() {
            ErrorNode::Coded {
                code: found, cause, ..
            } => {
                if *found == code {
                    return true;
                }
                match cause {
                    Some(cause) => current = peel(&**cause),
                    None => return false,
                }
            }
            ErrorNode::Fundamental { .. }
            | ErrorNode::Stacked { .. }
            | ErrorNode::Messaged { .. } => return false,
        }
    }
}

static GLOBAL: OnceLock<CodeRegistry> = OnceLock::new();

/// The process-wide registry, created on first use.
pub fn global() -> &'static CodeRegistry {
    GLOBAL.get_or_init(CodeRegistry::new)
}

/// [`CodeRegistry::register`] on the process-wide registry.
pub fn register(coder: Coder) -> Result<Option<Coder>, RegistryError> {
    global().register(coder)
}

/// [`CodeRegistry::must_register`] on the process-wide registry.
#[track_caller]
pub fn must_register(coder: Coder) {
    global().must_register(coder)
}

/// [`CodeRegistry::parse_coder`] on the process-wide registry.
pub fn parse_coder<E>(err: Option<&E>) -> Option<Coder>
where
    E: AsDynError + ?Sized,
{
    global().parse_coder(err)
}
