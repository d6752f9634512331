use std::collections::BTreeSet;

use super::types::{Filter, FilterCondition, FlatQuery, QueryOptions, QueryValue};

/// Keys reserved for pagination; never filter fields.
const PAGINATION_KEYS: [&str; 2] = ["page", "limit"];

const GTE_SUFFIX: &str = ".gte";
const LTE_SUFFIX: &str = ".lte";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Gte,
    Lte,
}

/// Translate a flat query into an AND-filter.
///
/// Conditions are emitted in a fixed order: exact matches, then substring
/// matches, then one range per base field (first-seen order). Keys that fit
/// no role are ignored.
///
/// Range bounds go through a truthiness check, so `0`, `""`, `null` and
/// `false` bounds are dropped the same way a missing bound is.
pub fn build_filter(query: &FlatQuery, options: &QueryOptions) -> Filter {
    let excluded: BTreeSet<&str> = options
        .exclude_fields
        .iter()
        .map(String::as_str)
        .chain(PAGINATION_KEYS)
        .collect();

    let mut conditions = exact_matches(query, options, &excluded);
    conditions.extend(non_exact_matches(query, options, &excluded));
    conditions.extend(range_conditions(query, &excluded));

    if !conditions.is_empty() {
        tracing::trace!(conditions = conditions.len(), "Built query filter");
    }

    Filter { conditions }
}

fn exact_matches(
    query: &FlatQuery,
    options: &QueryOptions,
    excluded: &BTreeSet<&str>,
) -> Vec<FilterCondition> {
    query
        .iter()
        .filter(|(key, _)| !excluded.contains(key) && options.exact_fields.contains(*key))
        .map(|(key, value)| FilterCondition::Eq {
            field: key.to_string(),
            value: value.clone(),
        })
        .collect()
}

fn non_exact_matches(
    query: &FlatQuery,
    options: &QueryOptions,
    excluded: &BTreeSet<&str>,
) -> Vec<FilterCondition> {
    query
        .iter()
        .filter(|(key, _)| !excluded.contains(key) && options.non_exact_fields.contains(*key))
        .filter_map(|(key, value)| {
            value.as_text().map(|text| FilterCondition::Contains {
                field: key.to_string(),
                text: text.to_string(),
            })
        })
        .collect()
}

fn range_conditions(query: &FlatQuery, excluded: &BTreeSet<&str>) -> Vec<FilterCondition> {
    // (base field, gte, lte) in first-seen order
    let mut ranges: Vec<(String, Option<QueryValue>, Option<QueryValue>)> = Vec::new();

    for (key, value) in query.iter() {
        if !value.is_truthy() || excluded.contains(key) {
            continue;
        }
        let Some((base, bound)) = split_range_key(key) else {
            continue;
        };

        let idx = match ranges.iter().position(|(field, _, _)| field == base) {
            Some(idx) => idx,
            None => {
                ranges.push((base.to_string(), None, None));
                ranges.len() - 1
            }
        };
        let entry = &mut ranges[idx];
        match bound {
            Bound::Gte => entry.1 = Some(value.clone()),
            Bound::Lte => entry.2 = Some(value.clone()),
        }
    }

    ranges
        .into_iter()
        .map(|(field, gte, lte)| FilterCondition::Range { field, gte, lte })
        .collect()
}

/// Split `popularity.GTE` into `("popularity", Gte)`. Suffix match ignores ASCII case.
fn split_range_key(key: &str) -> Option<(&str, Bound)> {
    let split_at = key.len().checked_sub(GTE_SUFFIX.len())?;
    if !key.is_char_boundary(split_at) {
        return None;
    }
    let (base, suffix) = key.split_at(split_at);
    if suffix.eq_ignore_ascii_case(GTE_SUFFIX) {
        Some((base, Bound::Gte))
    } else if suffix.eq_ignore_ascii_case(LTE_SUFFIX) {
        Some((base, Bound::Lte))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(field: &str, gte: Option<QueryValue>, lte: Option<QueryValue>) -> FilterCondition {
        FilterCondition::Range {
            field: field.to_string(),
            gte,
            lte,
        }
    }

    #[test]
    fn test_empty_query_yields_empty_filter() {
        let filter = build_filter(&FlatQuery::new(), &QueryOptions::new());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_exact_fields_emit_equality() {
        let query = FlatQuery::new().with("id", 1).with("name", "Test");
        let filter = build_filter(&query, &QueryOptions::new().exact(["id"]));

        assert_eq!(
            filter.conditions,
            vec![FilterCondition::Eq {
                field: "id".to_string(),
                value: QueryValue::Int(1),
            }]
        );
    }

    #[test]
    fn test_non_exact_fields_emit_substring_match() {
        let query = FlatQuery::new().with("name", "Test");
        let filter = build_filter(&query, &QueryOptions::new().non_exact(["name"]));

        assert_eq!(
            filter.conditions,
            vec![FilterCondition::Contains {
                field: "name".to_string(),
                text: "Test".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_exact_fields_ignore_non_text_values() {
        let query = FlatQuery::new().with("name", 42);
        let filter = build_filter(&query, &QueryOptions::new().non_exact(["name"]));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_range_suffixes_merge_into_one_condition() {
        let query = FlatQuery::new().with("price.gte", 10).with("price.lte", 50);
        let filter = build_filter(&query, &QueryOptions::new());

        assert_eq!(
            filter.conditions,
            vec![range(
                "price",
                Some(QueryValue::Int(10)),
                Some(QueryValue::Int(50))
            )]
        );
    }

    #[test]
    fn test_exclude_fields_drop_conditions() {
        let query = FlatQuery::new().with("id", 1).with("name", "Test");
        let options = QueryOptions::new().exclude(["id"]).non_exact(["name"]);
        let filter = build_filter(&query, &options);

        assert_eq!(
            filter.conditions,
            vec![FilterCondition::Contains {
                field: "name".to_string(),
                text: "Test".to_string(),
            }]
        );
    }

    #[test]
    fn test_pagination_keys_are_never_filters() {
        let query = FlatQuery::new().with("page", 2).with("limit", 5);
        let options = QueryOptions::new().exact(["page", "limit"]);
        assert!(build_filter(&query, &options).is_empty());
    }

    #[test]
    fn test_excluded_range_keys_are_skipped() {
        let query = FlatQuery::new()
            .with("price.gte", 10)
            .with("votes.lte", 3);
        let options = QueryOptions::new().exclude(["price.gte"]);
        let filter = build_filter(&query, &options);

        assert_eq!(
            filter.conditions,
            vec![range("votes", None, Some(QueryValue::Int(3)))]
        );
    }

    #[test]
    fn test_falsy_range_bounds_are_dropped() {
        let query = FlatQuery::new()
            .with("popularity.gte", 0)
            .with("popularity.lte", 5)
            .with("voteCount.gte", "")
            .with("releaseDate.lte", QueryValue::Null);
        let filter = build_filter(&query, &QueryOptions::new());

        assert_eq!(
            filter.conditions,
            vec![range("popularity", None, Some(QueryValue::Int(5)))]
        );
    }

    #[test]
    fn test_range_suffix_match_ignores_case() {
        let query = FlatQuery::new()
            .with("releaseDate.GTE", "1990-01-01")
            .with("releaseDate.lte", "1999-12-31");
        let filter = build_filter(&query, &QueryOptions::new());

        assert_eq!(
            filter.conditions,
            vec![range(
                "releaseDate",
                Some(QueryValue::from("1990-01-01")),
                Some(QueryValue::from("1999-12-31"))
            )]
        );
    }

    #[test]
    fn test_conditions_follow_exact_non_exact_range_order() {
        let query = FlatQuery::new()
            .with("voteAverage.gte", 8.0)
            .with("name", "god")
            .with("popularity.lte", 90.5)
            .with("id", 238)
            .with("voteAverage.lte", 9.5);
        let options = QueryOptions::new().exact(["id"]).non_exact(["name"]);
        let filter = build_filter(&query, &options);

        let fields: Vec<&str> = filter.conditions.iter().map(|c| c.field()).collect();
        assert_eq!(fields, vec!["id", "name", "voteAverage", "popularity"]);
        assert_eq!(
            filter.conditions[2],
            range(
                "voteAverage",
                Some(QueryValue::Float(8.0)),
                Some(QueryValue::Float(9.5))
            )
        );
    }

    #[test]
    fn test_exact_and_range_passes_are_independent() {
        let query = FlatQuery::new().with("score.gte", 3);
        let options = QueryOptions::new().exact(["score.gte"]);
        let filter = build_filter(&query, &options);

        assert_eq!(
            filter.conditions,
            vec![
                FilterCondition::Eq {
                    field: "score.gte".to_string(),
                    value: QueryValue::Int(3),
                },
                range("score", Some(QueryValue::Int(3)), None),
            ]
        );
    }

    #[test]
    fn test_exact_match_keeps_null_values() {
        let query = FlatQuery::new().with("overview", QueryValue::Null);
        let filter = build_filter(&query, &QueryOptions::new().exact(["overview"]));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_unclassified_fields_are_ignored() {
        let query = FlatQuery::new().with("genre", "Drama").with("sort", "asc");
        let filter = build_filter(&query, &QueryOptions::new().exact(["id"]));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_split_range_key() {
        assert_eq!(split_range_key("a.gte"), Some(("a", Bound::Gte)));
        assert_eq!(split_range_key("a.LtE"), Some(("a", Bound::Lte)));
        assert_eq!(split_range_key(".gte"), Some(("", Bound::Gte)));
        assert_eq!(split_range_key("gte"), None);
        assert_eq!(split_range_key("a.gt"), None);
        assert_eq!(split_range_key("é.gte"), Some(("é", Bound::Gte)));
    }
}
