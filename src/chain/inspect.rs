//! Walking and querying error chains.

use std::error::Error as StdError;

use super::node::{AsDynError, DynError, Error};
use crate::aggregate::group_members;

/// Strips `Arc` layers that hide the concrete error type from downcasts.
pub(crate) fn peel<'a>(mut err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    while let Some(shared) = err.downcast_ref::<DynError>() {
        err = &**shared;
    }
    err
}

/// Iterator over a chain, outermost error first.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = peel(self.next?);
        self.next = current.source();
        Some(current)
    }
}

/// Returns the chain starting at `err` and following `source()` links.
pub fn chain<E>(err: &E) -> Chain<'_>
where
    E: AsDynError + ?Sized,
{
    Chain {
        next: Some(err.as_dyn_error()),
    }
}

/// One step down the chain.
pub fn unwrap<E>(err: &E) -> Option<&(dyn StdError + 'static)>
where
    E: AsDynError + ?Sized,
{
    peel(err.as_dyn_error()).source()
}

/// Follows direct causes of this crate's nodes to the root.
///
/// The walk stops at the first node that has no cause of its own, including
/// foreign errors, even if those expose a `source()`.
pub fn cause<E>(err: Option<&E>) -> Option<&(dyn StdError + 'static)>
where
    E: AsDynError + ?Sized,
{
    let mut current = peel(err?.as_dyn_error());
    while let Some(next) = current
        .downcast_ref::<Error>()
        .and_then(Error::direct_cause)
    {
        current = peel(&**next);
    }
    Some(current)
}

/// Reports whether any error in the chain matches `target`.
///
/// A node matches when it downcasts to `T` and compares equal, or when it is an
/// [`Aggregate`](crate::aggregate::Aggregate) or registered
/// [`ErrorGroup`](crate::aggregate::ErrorGroup) holding a matching member.
pub fn is<E, T>(err: &E, target: &T) -> bool
where
    E: AsDynError + ?Sized,
    T: StdError + PartialEq + 'static,
{
    chain(err).any(|node| {
        node.downcast_ref::<T>().is_some_and(|candidate| candidate == target)
            || group_members(node)
                .is_some_and(|members| members.iter().any(|member| is(&**member, target)))
    })
}

/// Finds the first error in the chain of concrete type `T`.
pub fn find<T, E>(err: &E) -> Option<&T>
where
    E: AsDynError + ?Sized,
    T: StdError + 'static,
{
    chain(err).find_map(|node| node.downcast_ref::<T>())
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::io;
    use std::sync::Arc;

    use super::*;
    use crate::chain::{with_code, with_message, with_stack, wrap};

    #[derive(Debug, PartialEq)]
    struct Timeout(u32);

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "timed out after {}s", self.0)
        }
    }

    impl StdError for Timeout {}

    #[test]
    fn test_chain_order_is_outermost_first() {
        let root = Error::new("root");
        let err = wrap(Some(root), "outer").unwrap();
        let texts: Vec<String> = chain(&err).map(|e| e.to_string()).collect();
        assert_eq!(texts, vec!["outer: root", "outer: root", "root"]);
    }

    #[test]
    fn test_unwrap_single_step() {
        let root = Error::new("root");
        let err = with_message(Some(root.clone()), "ctx").unwrap();
        let next = unwrap(&err).unwrap();
        assert_eq!(next.downcast_ref::<Error>(), Some(&root));
        assert!(unwrap(&root).is_none());
    }

    #[test]
    fn test_cause_none_is_none() {
        assert!(cause(None::<&Error>).is_none());
    }

    #[test]
    fn test_cause_reaches_root() {
        let root = Error::new("root");
        let err = wrap(with_stack(Some(root.clone())), "ctx").unwrap();
        let found = cause(Some(&err)).unwrap();
        assert_eq!(found.downcast_ref::<Error>(), Some(&root));
    }

    #[test]
    fn test_cause_stops_at_foreign_error() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk");
        let err = with_code(Some(io_err), 300001, "storage").unwrap();
        let found = cause(Some(&err)).unwrap();
        assert_eq!(found.to_string(), "disk");
        assert!(found.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn test_is_matches_sentinel_through_wrappers() {
        let sentinel = Error::new("not found");
        let err = wrap(with_message(Some(sentinel.clone()), "lookup"), "handler").unwrap();
        assert!(is(&err, &sentinel));
        assert!(!is(&err, &Error::new("not found")));
    }

    #[test]
    fn test_is_with_foreign_value_type() {
        let err = with_stack(Some(Timeout(5))).unwrap();
        assert!(is(&err, &Timeout(5)));
        assert!(!is(&err, &Timeout(6)));
    }

    #[test]
    fn test_find_returns_first_match() {
        let err = wrap(Some(Timeout(30)), "poll").unwrap();
        let timeout = find::<Timeout, _>(&err).unwrap();
        assert_eq!(timeout.0, 30);
        assert!(find::<io::Error, _>(&err).is_none());
    }

    #[test]
    fn test_peel_sees_through_shared_layers() {
        let shared: DynError = Arc::new(Timeout(1));
        let layered: DynError = Arc::new(Arc::clone(&shared));
        assert!(peel(&*layered).downcast_ref::<Timeout>().is_some());
    }
}
