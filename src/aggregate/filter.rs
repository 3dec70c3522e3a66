//! Removing known errors from aggregates.

use std::error::Error as StdError;
use std::sync::Arc;

use super::{group_members, Aggregate};
use crate::chain::{into_dyn, peel, DynError};

/// Predicate selecting errors to drop.
pub type Matcher<'a> = &'a dyn Fn(&(dyn StdError + 'static)) -> bool;

/// Reports whether any matcher accepts `err`.
pub fn matches(err: &(dyn StdError + 'static), matchers: &[Matcher<'_>]) -> bool {
    matchers.iter().any(|matcher| matcher(err))
}

/// Drops every error accepted by a matcher.
///
/// A plain error is kept or dropped as a whole. An aggregate is filtered member
/// by member; nested aggregates are filtered in place and stay nested. Members
/// that end up empty are dropped, and `None` is returned when nothing is left.
/// A registered [`ErrorGroup`](super::ErrorGroup) is filtered the same way and
/// comes back as an [`Aggregate`] of its remaining members.
pub fn filter_out<E>(err: Option<E>, matchers: &[Matcher<'_>]) -> Option<DynError>
where
    E: StdError + Send + Sync + 'static,
{
    filter_dyn(into_dyn(err?), matchers)
}

fn filter_dyn(err: DynError, matchers: &[Matcher<'_>]) -> Option<DynError> {
    if let Some(members) = group_members(&*err) {
        let kept = members
            .iter()
            .map(|member| filter_dyn(Arc::clone(member), matchers));
        return Aggregate::new(kept).map(Aggregate::into_dyn);
    }
    if matches(peel(&*err), matchers) {
        None
    } else {
        Some(err)
    }
}

/// Expands nested aggregates into one flat aggregate, keeping leaf order.
pub fn flatten(aggregate: Option<&Aggregate>) -> Option<Aggregate> {
    aggregate?.flatten()
}
