use bson::{Bson, Document};
use tracing::{debug, warn};

use crate::error::QueryError;
use crate::operator::expand;
use crate::options::{resolve_limit, resolve_projection, resolve_skip, resolve_sort};
use crate::query::{QueryDefaults, QuerySpec};

/// Reserved argument keys that configure query options rather than filter
/// fields.
const OPTION_KEYS: [&str; 4] = ["limit", "projection", "skip", "sort"];

/// Translate raw request arguments plus deployment defaults into one query.
///
/// `arguments` are the ordered `(key, value)` pairs of the request query
/// string; a repeated key keeps only its last value. `single_result` marks
/// single-document routes, which force `limit = 1`.
///
/// The default filter is authored in the same micro-language as request
/// values and always takes precedence on conflicts — defaults carry
/// deployment policy that request input must not override. A `null` default
/// is the escape hatch meaning "no policy, defer to the caller".
pub fn build_query(
    defaults: &QueryDefaults,
    arguments: &[(String, String)],
    single_result: bool,
) -> Result<QuerySpec, QueryError> {
    // Collapse repeated keys — only the last value for a key is significant.
    let raw = collapse(arguments);
    let mut expanded = expand_pairs(&raw)?;
    debug!(arguments = ?expanded, "expanded request arguments");

    // Pull the reserved option keys out of the filter arguments, overriding
    // staged defaults only with non-empty values.
    let mut staged = defaults.options.clone();
    for key in OPTION_KEYS {
        if let Some(value) = expanded.remove(key) {
            if !is_empty(&value) {
                staged.insert(key, value);
            }
        }
    }

    let limit = resolve_limit(single_result, &raw, &staged)?;
    let skip = resolve_skip(&raw, &staged)?;
    let sort = resolve_sort(&raw, &staged);
    let projection = resolve_projection(&raw, &staged);

    let filter = merge_filter(&defaults.filter, &expanded)?;
    debug!(?filter, limit, "built query");

    Ok(QuerySpec {
        filter,
        limit,
        skip,
        sort,
        projection,
    })
}

/// Expand raw `(key, value)` pairs into a document of query clauses,
/// collapsing repeated keys last-value-wins first.
///
/// This is the argument-unpacking step of [`build_query`], exposed on its
/// own for callers that build documents rather than filters (inserts and
/// updates use the same micro-language).
pub fn expand_arguments(arguments: &[(String, String)]) -> Result<Document, QueryError> {
    expand_pairs(&collapse(arguments))
}

fn expand_pairs(collapsed: &[(String, String)]) -> Result<Document, QueryError> {
    let mut expanded = Document::new();
    for (key, value) in collapsed {
        let clause = expand(key, &Bson::String(value.clone()))?;
        if clause.value.is_unrecognized() {
            warn!(field = %key, value = %value, "unrecognized operator, passing value through");
        }
        insert_clause(&mut expanded, clause.field, clause.value.into_bson());
    }
    Ok(expanded)
}

fn collapse(arguments: &[(String, String)]) -> Vec<(String, String)> {
    let mut collapsed: Vec<(String, String)> = Vec::new();
    for (key, value) in arguments {
        match collapsed.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.clone(),
            None => collapsed.push((key.clone(), value.clone())),
        }
    }
    collapsed
}

/// Merge the default filter with the expanded arguments.
///
/// Walks the union of keys — default keys in insertion order, then
/// argument-only keys — so identical inputs always produce an identical
/// filter document. Default values run through the expander too, which may
/// rewrite the key they land under.
fn merge_filter(default_filter: &Document, arguments: &Document) -> Result<Document, QueryError> {
    let mut keys: Vec<String> = default_filter.keys().cloned().collect();
    for key in arguments.keys() {
        if !default_filter.contains_key(key) {
            keys.push(key.clone());
        }
    }

    let mut filter = Document::new();
    for key in keys {
        let default_value = default_filter.get(&key).cloned().unwrap_or(Bson::Null);
        let expanded = expand(&key, &default_value)?;
        let key = expanded.field;
        let default_value = expanded.value.into_bson();
        let argument_value = arguments.get(&key);

        match (default_value, argument_value) {
            // No default policy for this field — defer to the caller.
            (Bson::Null, Some(argument)) => insert_clause(&mut filter, key, argument.clone()),
            // No caller value — the default applies as-is.
            (default, None) => insert_clause(&mut filter, key, default),
            // Both are operator documents: union their keys, default wins
            // on overlapping operator names.
            (Bson::Document(default), Some(Bson::Document(argument))) => {
                let mut merged = argument.clone();
                for (operator, value) in default {
                    merged.insert(operator, value);
                }
                insert_clause(&mut filter, key, Bson::Document(merged));
            }
            // Both present otherwise — the default always wins.
            (default, Some(_)) => insert_clause(&mut filter, key, default),
        }
    }

    Ok(filter)
}

/// Insert a clause, accumulating the logical-operator slots instead of
/// overwriting them when the same slot is produced twice.
fn insert_clause(filter: &mut Document, field: String, value: Bson) {
    let logical = matches!(field.as_str(), "$and" | "$or" | "$nor");
    let extendable = logical
        && matches!(
            (filter.get(&field), &value),
            (Some(Bson::Array(_)), Bson::Array(_))
        );

    if extendable {
        if let (Some(Bson::Array(existing)), Bson::Array(clauses)) =
            (filter.get_mut(&field), value)
        {
            existing.extend(clauses);
        }
    } else {
        filter.insert(field, value);
    }
}

fn is_empty(value: &Bson) -> bool {
    matches!(value, Bson::String(s) if s.is_empty())
}
