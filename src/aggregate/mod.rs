//! Multi-error aggregation.
//!
//! An [`Aggregate`] holds several independent errors and behaves as one error.
//! Members keep insertion order, duplicates are allowed, and nested aggregates
//! are kept nested until [`flatten`] is asked for.
//!
//! Other error types holding sub-errors implement [`ErrorGroup`]. Once announced
//! with [`register_group`], members of that type are descended into like nested
//! aggregates by `Display`, [`Aggregate::is`], [`flatten`] and [`filter_out`].

mod filter;
mod parallel;

use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::chain::{into_dyn, is, peel, DynError};

pub use filter::{filter_out, flatten, matches, Matcher};
pub use parallel::{aggregate_parallel, aggregate_threads};

/// Capability of error types that hold an ordered list of sub-errors.
pub trait ErrorGroup {
    /// Direct sub-errors, in order. Nested groups are not expanded.
    fn errors(&self) -> &[DynError];
}

type GroupLookup = for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a [DynError]>;

static GROUPS: RwLock<Vec<(TypeId, GroupLookup)>> = RwLock::new(Vec::new());

fn members_of<'a, T>(err: &'a (dyn StdError + 'static)) -> Option<&'a [DynError]>
where
    T: ErrorGroup + StdError + 'static,
{
    err.downcast_ref::<T>().map(|group| group.errors())
}

/// Makes `T` visible as a group wherever aggregates are traversed.
///
/// Registering the same type again has no effect.
pub fn register_group<T>()
where
    T: ErrorGroup + StdError + 'static,
{
    let id = TypeId::of::<T>();
    let mut groups = GROUPS.write().unwrap_or_else(PoisonError::into_inner);
    if groups.iter().any(|(known, _)| *known == id) {
        return;
    }
    let lookup: GroupLookup = members_of::<T>;
    groups.push((id, lookup));
    tracing::debug!(group = type_name::<T>(), "registered error group type");
}

/// Sub-errors of `err` if it is an [`Aggregate`] or a registered group.
pub(crate) fn group_members<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a [DynError]> {
    let err = peel(err);
    if let Some(aggregate) = err.downcast_ref::<Aggregate>() {
        return Some(aggregate.errors());
    }
    let groups = GROUPS.read().unwrap_or_else(PoisonError::into_inner);
    groups.iter().find_map(|(_, lookup)| lookup(err))
}

/// A non-empty list of errors rendered as one.
#[derive(Debug, Clone)]
pub struct Aggregate {
    errors: Vec<DynError>,
}

impl Aggregate {
    /// Builds an aggregate from the `Some` entries of `errors`.
    ///
    /// Returns `None` when no error remains.
    pub fn new<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<E>>,
        E: StdError + Send + Sync + 'static,
    {
        let errors: Vec<DynError> = errors.into_iter().flatten().map(into_dyn).collect();
        if errors.is_empty() {
            return None;
        }
        Some(Self { errors })
    }

    /// Copies the members of any other group.
    pub fn from_group<G>(group: &G) -> Option<Self>
    where
        G: ErrorGroup + ?Sized,
    {
        Self::new(group.errors().iter().cloned().map(Some))
    }

    /// Top-level members, not flattened.
    pub fn errors(&self) -> &[DynError] {
        &self.errors
    }

    /// Number of top-level members.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false for aggregates built through [`Aggregate::new`].
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Reports whether any leaf matches `target` (see [`is`](crate::chain::is)).
    pub fn is<T>(&self, target: &T) -> bool
    where
        T: StdError + PartialEq + 'static,
    {
        self.visit(&mut |leaf| is(leaf, target))
    }

    /// Recursively collects leaves into a single-level aggregate.
    pub fn flatten(&self) -> Option<Self> {
        let mut leaves = Vec::with_capacity(self.errors.len());
        self.collect_leaves(&mut leaves);
        Self::new(leaves.into_iter().map(Some))
    }

    /// Shares the aggregate as a member of another chain or aggregate.
    pub fn into_dyn(self) -> DynError {
        Arc::new(self)
    }

    fn visit<F>(&self, f: &mut F) -> bool
    where
        F: FnMut(&(dyn StdError + 'static)) -> bool,
    {
        visit_members(&self.errors, f)
    }

    fn collect_leaves(&self, leaves: &mut Vec<DynError>) {
        collect_members(&self.errors, leaves);
    }
}

/// Calls `f` on every leaf, descending into nested groups.
/// Stops early and returns true as soon as `f` does.
fn visit_members<F>(members: &[DynError], f: &mut F) -> bool
where
    F: FnMut(&(dyn StdError + 'static)) -> bool,
{
    for member in members {
        let matched = match group_members(&**member) {
            Some(nested) => visit_members(nested, f),
            None => f(peel(&**member)),
        };
        if matched {
            return true;
        }
    }
    false
}

fn collect_members(members: &[DynError], leaves: &mut Vec<DynError>) {
    for member in members {
        match group_members(&**member) {
            Some(nested) => collect_members(nested, leaves),
            None => leaves.push(Arc::clone(member)),
        }
    }
}

impl ErrorGroup for Aggregate {
    fn errors(&self) -> &[DynError] {
        &self.errors
    }
}

/// A single member renders as itself. Several members render as the distinct
/// leaf messages in first-seen order, bracketed unless only one distinct
/// message remains.
///
/// # Panics
/// If the aggregate has no members.
impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => panic!("aggregate has no members"),
            [only] => write!(f, "{}", only),
            _ => {
                let mut seen = HashSet::new();
                let mut messages = Vec::new();
                self.visit(&mut |leaf| {
                    let message = leaf.to_string();
                    if seen.insert(message.clone()) {
                        messages.push(message);
                    }
                    false
                });

                if messages.len() == 1 {
                    f.write_str(&messages[0])
                } else {
                    write!(f, "[{}]", messages.join(", "))
                }
            }
        }
    }
}

impl StdError for Aggregate {}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::chain::{wrap, Error};

    fn agg(errors: Vec<Error>) -> Aggregate {
        Aggregate::new(errors.into_iter().map(Some)).unwrap()
    }

    #[derive(Debug)]
    struct Batch(Vec<DynError>);

    impl fmt::Display for Batch {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("batch")
        }
    }

    impl StdError for Batch {}

    impl ErrorGroup for Batch {
        fn errors(&self) -> &[DynError] {
            &self.0
        }
    }

    #[derive(Debug)]
    struct Unlisted(Vec<DynError>);

    impl fmt::Display for Unlisted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("unlisted")
        }
    }

    impl StdError for Unlisted {}

    impl ErrorGroup for Unlisted {
        fn errors(&self) -> &[DynError] {
            &self.0
        }
    }

    #[test]
    fn test_new_drops_none() {
        assert!(Aggregate::new(Vec::<Option<Error>>::new()).is_none());
        assert!(Aggregate::new(vec![None::<Error>, None]).is_none());

        let aggregate = Aggregate::new(vec![None, Some(Error::new("a")), None]).unwrap();
        assert_eq!(aggregate.len(), 1);
        assert!(!aggregate.is_empty());
    }

    #[test]
    fn test_display_single_member_verbatim() {
        let aggregate = agg(vec![Error::new("only")]);
        assert_eq!(aggregate.to_string(), "only");
    }

    #[test]
    fn test_display_dedups_messages() {
        assert_eq!(agg(vec![Error::new("a"), Error::new("a")]).to_string(), "a");
        assert_eq!(agg(vec![Error::new("a"), Error::new("b")]).to_string(), "[a, b]");
        assert_eq!(
            agg(vec![Error::new("b"), Error::new("a"), Error::new("b")]).to_string(),
            "[b, a]"
        );
    }

    #[test]
    fn test_display_descends_into_nested() {
        let inner = agg(vec![Error::new("x"), Error::new("y")]);
        let outer = Aggregate::new(vec![
            Some(inner.into_dyn()),
            Some(Error::new("x").into_dyn()),
            Some(Error::new("z").into_dyn()),
        ])
        .unwrap();
        assert_eq!(outer.to_string(), "[x, y, z]");
        assert_eq!(outer.errors().len(), 3);
    }

    #[test]
    #[should_panic(expected = "aggregate has no members")]
    fn test_display_empty_panics() {
        let empty = Aggregate { errors: Vec::new() };
        let _ = empty.to_string();
    }

    #[test]
    fn test_is_checks_every_leaf_chain() {
        let sentinel = Error::new("eof");
        let nested = agg(vec![Error::new("a"), wrap(Some(sentinel.clone()), "read").unwrap()]);
        let outer = Aggregate::new(vec![Some(Error::new("b").into_dyn()), Some(nested.into_dyn())])
            .unwrap();

        assert!(outer.is(&sentinel));
        assert!(!outer.is(&Error::new("eof")));
    }

    #[test]
    fn test_is_through_chain_entry_point() {
        let sentinel = Error::new("eof");
        let aggregate = agg(vec![sentinel.clone()]);
        let wrapped = wrap(Some(aggregate), "batch").unwrap();
        assert!(crate::chain::is(&wrapped, &sentinel));
    }

    #[test]
    fn test_from_group_copies_members() {
        let aggregate = agg(vec![Error::new("a"), Error::new("b")]);
        let copy = Aggregate::from_group(&aggregate).unwrap();
        assert_eq!(copy.len(), 2);
        assert!(Arc::ptr_eq(&copy.errors()[0], &aggregate.errors()[0]));
    }

    #[test]
    fn test_registered_group_is_descended() {
        register_group::<Batch>();
        register_group::<Batch>();

        let sentinel = Error::new("y");
        let batch = Batch(vec![Error::new("x").into_dyn(), sentinel.clone().into_dyn()]);
        let outer =
            Aggregate::new(vec![Some(into_dyn(batch)), Some(Error::new("z").into_dyn())]).unwrap();

        assert_eq!(outer.to_string(), "[x, y, z]");
        assert_eq!(outer.flatten().unwrap().len(), 3);
        assert!(outer.is(&sentinel));
        assert!(group_members(&*outer.errors()[0]).is_some());
        assert_eq!(
            GROUPS
                .read()
                .unwrap()
                .iter()
                .filter(|(id, _)| *id == TypeId::of::<Batch>())
                .count(),
            1
        );
    }

    #[test]
    fn test_unregistered_group_is_a_leaf() {
        let unlisted = Unlisted(vec![Error::new("x").into_dyn(), Error::new("y").into_dyn()]);
        let outer =
            Aggregate::new(vec![Some(into_dyn(unlisted)), Some(Error::new("z").into_dyn())])
                .unwrap();

        assert_eq!(outer.to_string(), "[unlisted, z]");
        assert_eq!(outer.flatten().unwrap().len(), 2);
    }

    #[test]
    fn test_foreign_members() {
        let aggregate = Aggregate::new(vec![
            Some(io::Error::new(io::ErrorKind::Other, "disk")),
            Some(io::Error::new(io::ErrorKind::Other, "net")),
        ])
        .unwrap();
        assert_eq!(aggregate.to_string(), "[disk, net]");
    }
}
