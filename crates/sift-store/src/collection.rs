use std::sync::RwLock;

use bson::oid::ObjectId;
use bson::{Bson, Document};
use sift_query::{QuerySpec, Sort, SortDirection};

use crate::error::StoreError;
use crate::matcher::{matches, order_values};

#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    pub inserted_id: Bson,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// An in-memory document collection.
///
/// Documents live in insertion order behind an `RwLock`; readers share,
/// writers serialize. This is the storage collaborator the translated
/// queries run against — it owns no query semantics beyond evaluating the
/// filter documents the engine produces.
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find documents matching the query: filter, then sort, skip, limit,
    /// and projection, in that order.
    pub fn find(&self, query: &QuerySpec) -> Result<Vec<Document>, StoreError> {
        let documents = self.read()?;

        let mut matched: Vec<&Document> = Vec::new();
        for document in documents.iter() {
            if matches(document, &query.filter)? {
                matched.push(document);
            }
        }

        if let Some(sort) = &query.sort {
            sort_documents(&mut matched, sort);
        }

        let skip = usize::try_from(query.skip.unwrap_or(0)).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        let page = matched.into_iter().skip(skip).take(limit);

        Ok(match &query.projection {
            Some(fields) => page.map(|document| project(document, fields)).collect(),
            None => page.cloned().collect(),
        })
    }

    pub fn count_matching(&self, filter: &Document) -> Result<u64, StoreError> {
        let documents = self.read()?;
        let mut count = 0;
        for document in documents.iter() {
            if matches(document, filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Insert a document, generating an ObjectId `_id` when absent.
    pub fn insert_one(&self, mut document: Document) -> Result<InsertOutcome, StoreError> {
        let mut documents = self.write()?;

        let inserted_id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        };

        if documents
            .iter()
            .any(|existing| existing.get("_id") == Some(&inserted_id))
        {
            return Err(StoreError::DuplicateId(inserted_id.to_string()));
        }

        documents.push(document);
        Ok(InsertOutcome { inserted_id })
    }

    /// Apply `$set`-style field assignments to the first matching document.
    pub fn update_one(
        &self,
        filter: &Document,
        set: &Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut documents = self.write()?;

        for document in documents.iter_mut() {
            if matches(document, filter)? {
                let mut modified = false;
                for (field, value) in set {
                    let previous = document.insert(field.clone(), value.clone());
                    if previous.as_ref() != Some(value) {
                        modified = true;
                    }
                }
                return Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                });
            }
        }

        Ok(UpdateOutcome {
            matched_count: 0,
            modified_count: 0,
        })
    }

    /// Delete the first matching document.
    pub fn delete_one(&self, filter: &Document) -> Result<DeleteOutcome, StoreError> {
        let mut documents = self.write()?;

        let mut found = None;
        for (index, document) in documents.iter().enumerate() {
            if matches(document, filter)? {
                found = Some(index);
                break;
            }
        }

        match found {
            Some(index) => {
                documents.remove(index);
                Ok(DeleteOutcome { deleted_count: 1 })
            }
            None => Ok(DeleteOutcome { deleted_count: 0 }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Document>>, StoreError> {
        self.documents
            .read()
            .map_err(|e| StoreError::Storage(format!("read lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Document>>, StoreError> {
        self.documents
            .write()
            .map_err(|e| StoreError::Storage(format!("write lock poisoned: {e}")))
    }
}

fn sort_documents(documents: &mut [&Document], sort: &Sort) {
    documents.sort_by(|a, b| {
        let ordering = order_values(a.get(&sort.field), b.get(&sort.field));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Keep only the projected fields; `_id` is always retained.
fn project(document: &Document, fields: &[String]) -> Document {
    let mut projected = Document::new();
    if let Some(id) = document.get("_id") {
        projected.insert("_id", id.clone());
    }
    for field in fields {
        if field == "_id" {
            continue;
        }
        if let Some(value) = document.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }
    projected
}
