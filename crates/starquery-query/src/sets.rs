//! Set algebra over query results
//!
//! Every operation deduplicates by [`Item::key`](crate::Item::key) and keeps
//! the order of its left operand. A missing operand (`None`) behaves as an
//! empty result, except that `a - None` is `a`.

use std::collections::HashSet;

use crate::item::{ItemKey, QueryResult};

fn keys(result: &QueryResult) -> HashSet<ItemKey<'_>> {
    result.iter().map(|item| item.key()).collect()
}

/// Items of `a`, then items of `b` not already seen
pub fn union(a: Option<&QueryResult>, b: Option<&QueryResult>) -> QueryResult {
    let items = a
        .into_iter()
        .chain(b)
        .flat_map(|r| r.iter().cloned())
        .collect();
    QueryResult::deduped(items)
}

/// Items of `a` whose key does not occur in `b`
pub fn difference(a: Option<&QueryResult>, b: Option<&QueryResult>) -> QueryResult {
    let Some(a) = a else {
        return QueryResult::new();
    };
    let excluded = b.map(keys).unwrap_or_default();
    let items = a
        .iter()
        .filter(|item| !excluded.contains(&item.key()))
        .cloned()
        .collect();
    QueryResult::deduped(items)
}

/// Items of `a` whose key also occurs in `b`
pub fn intersection(a: Option<&QueryResult>, b: Option<&QueryResult>) -> QueryResult {
    let (Some(a), Some(b)) = (a, b) else {
        return QueryResult::new();
    };
    let included = keys(b);
    let items = a
        .iter()
        .filter(|item| included.contains(&item.key()))
        .cloned()
        .collect();
    QueryResult::deduped(items)
}
