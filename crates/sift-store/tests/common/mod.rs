use bson::{Document, doc};
use sift_query::QuerySpec;
use sift_store::MemoryCollection;

/// A collection seeded with 5 account documents.
pub fn seeded_collection() -> MemoryCollection {
    let collection = MemoryCollection::new("accounts");
    let records = [
        doc! { "_id": "acct-1", "name": "Acme Corp", "revenue": 50000.0, "status": "active", "active": true },
        doc! { "_id": "acct-2", "name": "Globex", "revenue": 80000.0, "status": "snoozed", "active": true },
        doc! { "_id": "acct-3", "name": "Initech", "revenue": 12000.0, "status": "rejected", "active": false },
        doc! { "_id": "acct-4", "name": "Umbrella", "revenue": 95000.0, "status": "active", "active": true },
        doc! { "_id": "acct-5", "name": "Stark Industries", "revenue": 200000.0, "status": "active", "active": false },
    ];
    for record in records {
        collection.insert_one(record).unwrap();
    }
    collection
}

/// A query with the given filter and otherwise default options.
pub fn spec(filter: Document) -> QuerySpec {
    QuerySpec {
        filter,
        limit: 10,
        skip: None,
        sort: None,
        projection: None,
    }
}
