mod common;
use common::*;

use bson::doc;
use sift_query::{QueryDefaults, Sort, SortDirection, build_query};

#[test]
fn find_no_filter() {
    let collection = seeded_collection();
    let results = collection.find(&spec(doc! {})).unwrap();
    assert_eq!(results.len(), 5);
}

#[test]
fn find_eq_filter() {
    let collection = seeded_collection();
    let results = collection.find(&spec(doc! { "status": "active" })).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn find_gt_filter() {
    let collection = seeded_collection();
    let results = collection
        .find(&spec(doc! { "revenue": { "$gt": 80000.0 } }))
        .unwrap();
    assert_eq!(results.len(), 2); // Umbrella (95k) and Stark (200k)
}

#[test]
fn find_respects_limit() {
    let collection = seeded_collection();
    let mut query = spec(doc! {});
    query.limit = 2;
    assert_eq!(collection.find(&query).unwrap().len(), 2);
}

#[test]
fn find_respects_skip() {
    let collection = seeded_collection();
    let mut query = spec(doc! {});
    query.skip = Some(4);
    assert_eq!(collection.find(&query).unwrap().len(), 1);
}

#[test]
fn find_sorts_descending() {
    let collection = seeded_collection();
    let mut query = spec(doc! {});
    query.sort = Some(Sort {
        field: "revenue".into(),
        direction: SortDirection::Desc,
    });
    let results = collection.find(&query).unwrap();
    assert_eq!(results[0].get_str("name").unwrap(), "Stark Industries");
    assert_eq!(results[4].get_str("name").unwrap(), "Initech");
}

#[test]
fn find_sorts_ascending() {
    let collection = seeded_collection();
    let mut query = spec(doc! {});
    query.sort = Some(Sort {
        field: "name".into(),
        direction: SortDirection::Asc,
    });
    let results = collection.find(&query).unwrap();
    assert_eq!(results[0].get_str("name").unwrap(), "Acme Corp");
}

#[test]
fn find_projection_keeps_id() {
    let collection = seeded_collection();
    let mut query = spec(doc! { "_id": "acct-1" });
    query.projection = Some(vec!["name".to_string()]);
    let results = collection.find(&query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0], doc! { "_id": "acct-1", "name": "Acme Corp" });
}

#[test]
fn find_from_translated_query() {
    // End to end: raw request arguments through the engine to the store.
    let collection = seeded_collection();
    let arguments = vec![
        ("status".to_string(), "$in:active,snoozed".to_string()),
        ("sort".to_string(), "-revenue".to_string()),
        ("limit".to_string(), "2".to_string()),
    ];
    let query = build_query(&QueryDefaults::default(), &arguments, false).unwrap();
    let results = collection.find(&query).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].get_str("name").unwrap(), "Stark Industries");
    assert_eq!(results[1].get_str("name").unwrap(), "Umbrella");
}

#[test]
fn find_default_filter_scopes_results() {
    // A deployment default the request cannot override.
    let collection = seeded_collection();
    let defaults = QueryDefaults {
        filter: doc! { "active": true },
        options: doc! {},
    };
    let arguments = vec![("active".to_string(), "false".to_string())];
    let query = build_query(&defaults, &arguments, false).unwrap();
    let results = collection.find(&query).unwrap();
    assert_eq!(results.len(), 3);
}
