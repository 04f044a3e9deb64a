// storefront/src/store/memory.rs

use super::{ensure_object, new_document_id, Document, DocumentStore, StoreError, StoreResult, WriteBatch, WriteOp};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// A process-local document store. Used for development and tests.
///
/// Every operation takes the single lock once, so a batch commit is atomic
/// with respect to every other operation on the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: RwLock<Collections>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Writes a document directly, replacing any existing one. For seeding.
  pub fn seed(&self, collection: &str, id: &str, data: Value) {
    self
      .collections
      .write()
      .entry(collection.to_string())
      .or_default()
      .insert(id.to_string(), data);
  }

  /// Number of documents in `collection`.
  pub fn count(&self, collection: &str) -> usize {
    self.collections.read().get(collection).map_or(0, BTreeMap::len)
  }

  /// Every document of `collection`, ordered by id.
  pub fn documents(&self, collection: &str) -> Vec<Document> {
    let guard = self.collections.read();
    guard
      .get(collection)
      .map(|docs| {
        docs
          .iter()
          .map(|(id, data)| to_document(collection, id, data))
          .collect()
      })
      .unwrap_or_default()
  }
}

fn to_document(collection: &str, id: &str, data: &Value) -> Document {
  Document {
    collection: collection.to_string(),
    id: id.to_string(),
    data: data.clone(),
  }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
    let guard = self.collections.read();
    Ok(
      guard
        .get(collection)
        .and_then(|docs| docs.get(id))
        .map(|data| to_document(collection, id, data)),
    )
  }

  async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Document>> {
    let guard = self.collections.read();
    let Some(docs) = guard.get(collection) else {
      return Ok(Vec::new());
    };
    Ok(
      docs
        .iter()
        .filter(|(_, data)| data.get(field) == Some(value))
        .map(|(id, data)| to_document(collection, id, data))
        .collect(),
    )
  }

  async fn insert(&self, collection: &str, id: Option<&str>, data: Value) -> StoreResult<String> {
    let mut ids = self.commit(WriteBatch::new().insert(collection, id, data)).await?;
    ids.pop().ok_or_else(|| StoreError::NotFound {
      collection: collection.to_string(),
      id: id.unwrap_or_default().to_string(),
    })
  }

  async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
    ensure_object(collection, &patch)?;
    let mut guard = self.collections.write();
    let existing = guard
      .get_mut(collection)
      .and_then(|docs| docs.get_mut(id))
      .ok_or_else(|| StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      })?;
    if let (Some(target), Value::Object(fields)) = (existing.as_object_mut(), patch) {
      for (key, value) in fields {
        target.insert(key, value);
      }
    }
    Ok(())
  }

  async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
    let mut guard = self.collections.write();
    Ok(
      guard
        .get_mut(collection)
        .and_then(|docs| docs.remove(id))
        .is_some(),
    )
  }

  async fn commit(&self, batch: WriteBatch) -> StoreResult<Vec<String>> {
    let mut guard = self.collections.write();

    // Validate everything before touching the map so a failing batch leaves no trace.
    let mut claimed: HashSet<(String, String)> = HashSet::new();
    let mut planned = Vec::with_capacity(batch.ops().len());
    for op in batch.into_ops() {
      match op {
        WriteOp::Insert { collection, id, data } => {
          ensure_object(&collection, &data)?;
          let id = id.unwrap_or_else(new_document_id);
          let taken = guard.get(&collection).is_some_and(|docs| docs.contains_key(&id));
          if taken || !claimed.insert((collection.clone(), id.clone())) {
            return Err(StoreError::AlreadyExists { collection, id });
          }
          planned.push(WriteOp::Insert {
            collection,
            id: Some(id),
            data,
          });
        }
        delete @ WriteOp::Delete { .. } => planned.push(delete),
      }
    }

    let mut inserted = Vec::new();
    for op in planned {
      match op {
        WriteOp::Insert { collection, id, data } => {
          let id = id.unwrap_or_else(new_document_id);
          guard.entry(collection).or_default().insert(id.clone(), data);
          inserted.push(id);
        }
        WriteOp::Delete { collection, id } => {
          if let Some(docs) = guard.get_mut(&collection) {
            docs.remove(&id);
          }
        }
      }
    }
    debug!(inserted = inserted.len(), "Memory store batch committed.");
    Ok(inserted)
  }
}
