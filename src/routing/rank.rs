//! Route ranking.
//!
//! The mux tries routes in registration order and the first match wins, so
//! routes are registered most specific first:
//!
//! 1. Verb, by canonical name, descending (`PUT` before `GET`, `ALL` last)
//! 2. Segment by segment: an empty segment after a non-empty one, a
//!    placeholder after a literal, otherwise lexicographic
//! 3. More segments first
//!
//! The sort is stable, so identical routes keep declaration order.

use std::cmp::Ordering;

use crate::registry::Route;

/// Total order over routes, most specific first.
pub fn compare_routes(a: &Route, b: &Route) -> Ordering {
    let by_verb = b.verb.as_str().cmp(a.verb.as_str());
    if by_verb != Ordering::Equal {
        return by_verb;
    }

    let sa: Vec<&str> = a.path.split('/').collect();
    let sb: Vec<&str> = b.path.split('/').collect();
    for (x, y) in sa.iter().zip(&sb) {
        if x == y {
            continue;
        }
        if x.is_empty() {
            return Ordering::Greater;
        }
        if y.is_empty() {
            return Ordering::Less;
        }
        match (x.starts_with(':'), y.starts_with(':')) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => return x.cmp(y),
        }
    }

    sb.len().cmp(&sa.len())
}

/// Stable-sort `items` by the rank of the route `key` extracts.
pub fn rank_by<T>(items: &mut [T], key: impl Fn(&T) -> &Route) {
    items.sort_by(|a, b| compare_routes(key(a), key(b)));
}

/// Stable-sort a list of routes.
pub fn rank_routes(routes: &mut [Route]) {
    rank_by(routes, |r| r);
}
