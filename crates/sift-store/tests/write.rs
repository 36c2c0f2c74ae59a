mod common;
use common::*;

use bson::{Bson, doc};
use sift_store::{MemoryCollection, StoreError};

#[test]
fn insert_generates_objectid() {
    let collection = MemoryCollection::new("test");
    let outcome = collection.insert_one(doc! { "name": "fresh" }).unwrap();
    assert!(matches!(outcome.inserted_id, Bson::ObjectId(_)));

    let results = collection.find(&spec(doc! { "name": "fresh" })).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].get("_id"), Some(&outcome.inserted_id));
}

#[test]
fn insert_keeps_explicit_id() {
    let collection = MemoryCollection::new("test");
    let outcome = collection
        .insert_one(doc! { "_id": "doc-1", "name": "explicit" })
        .unwrap();
    assert_eq!(outcome.inserted_id, Bson::String("doc-1".into()));
}

#[test]
fn insert_duplicate_id_errors() {
    let collection = MemoryCollection::new("test");
    collection.insert_one(doc! { "_id": "doc-1" }).unwrap();
    let err = collection.insert_one(doc! { "_id": "doc-1" }).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId(_)));
}

#[test]
fn update_one_sets_fields() {
    let collection = seeded_collection();
    let outcome = collection
        .update_one(&doc! { "_id": "acct-1" }, &doc! { "status": "closed" })
        .unwrap();
    assert_eq!(outcome.matched_count, 1);
    assert_eq!(outcome.modified_count, 1);

    let results = collection.find(&spec(doc! { "_id": "acct-1" })).unwrap();
    assert_eq!(results[0].get_str("status").unwrap(), "closed");
}

#[test]
fn update_one_touches_first_match_only() {
    let collection = seeded_collection();
    collection
        .update_one(&doc! { "status": "active" }, &doc! { "status": "audited" })
        .unwrap();
    assert_eq!(
        collection.count_matching(&doc! { "status": "active" }).unwrap(),
        2
    );
}

#[test]
fn update_one_no_match() {
    let collection = seeded_collection();
    let outcome = collection
        .update_one(&doc! { "_id": "missing" }, &doc! { "status": "closed" })
        .unwrap();
    assert_eq!(outcome.matched_count, 0);
    assert_eq!(outcome.modified_count, 0);
}

#[test]
fn update_one_unchanged_value_is_not_modified() {
    let collection = seeded_collection();
    let outcome = collection
        .update_one(&doc! { "_id": "acct-1" }, &doc! { "status": "active" })
        .unwrap();
    assert_eq!(outcome.matched_count, 1);
    assert_eq!(outcome.modified_count, 0);
}

#[test]
fn delete_one_removes_first_match() {
    let collection = seeded_collection();
    let outcome = collection.delete_one(&doc! { "_id": "acct-2" }).unwrap();
    assert_eq!(outcome.deleted_count, 1);
    assert_eq!(collection.count_matching(&doc! {}).unwrap(), 4);
}

#[test]
fn delete_one_no_match() {
    let collection = seeded_collection();
    let outcome = collection.delete_one(&doc! { "_id": "missing" }).unwrap();
    assert_eq!(outcome.deleted_count, 0);
    assert_eq!(collection.count_matching(&doc! {}).unwrap(), 5);
}
