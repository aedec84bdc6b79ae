//! Search query-string parsing
//!
//! - `filter[<field>]=<value>` adds an equality filter
//! - `order_by=song:desc,group` adds sort criteria; direction defaults to `asc`
//! - `offset` / `limit` set pagination; unparsable numbers are ignored
//!
//! Field names are not checked here. The whitelist is applied when the
//! query is turned into SQL.

use crate::models::{Page, SearchQuery, SortCriterion};

const FILTER_PREFIX: &str = "filter[";
const FILTER_SUFFIX: &str = "]";

/// Read `offset` and `limit` from query pairs.
pub fn parse_page(pairs: &[(String, String)]) -> Page {
    Page::new(number(pairs, "offset"), number(pairs, "limit"))
}

/// Build a search query from raw query pairs.
pub fn parse_search(pairs: &[(String, String)]) -> SearchQuery {
    let mut query = SearchQuery {
        page: parse_page(pairs),
        ..Default::default()
    };

    for (key, value) in pairs {
        if let Some(field) = key
            .strip_prefix(FILTER_PREFIX)
            .and_then(|rest| rest.strip_suffix(FILTER_SUFFIX))
        {
            // First value wins for a repeated filter
            query
                .filters
                .entry(field.to_owned())
                .or_insert_with(|| value.clone());
        }
    }

    if let Some(order_by) = first(pairs, "order_by") {
        query.sort = parse_order_by(order_by);
    }

    query
}

fn parse_order_by(order_by: &str) -> Vec<SortCriterion> {
    order_by
        .split(',')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once(':') {
            Some((field, direction)) => SortCriterion::new(field, direction),
            None => SortCriterion::new(part, "asc"),
        })
        .collect()
}

fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn number(pairs: &[(String, String)], key: &str) -> Option<i64> {
    first(pairs, key).and_then(|v| v.trim().parse().ok())
}
