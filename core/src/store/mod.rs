// storefront/src/store/mod.rs

//! Document store abstraction.
//!
//! Documents are JSON objects addressed by `(collection, id)`. The checkout
//! only relies on the operations of [`DocumentStore`]; concrete backends are
//! [`MemoryStore`] and [`PgDocumentStore`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Collection names used by the storefront.
pub mod collections {
  pub const PRICES: &str = "prices";
  pub const PRODUCTS: &str = "products";
  pub const PROMOTION_CODES: &str = "promotion_codes";
  pub const SHIPPING_COUNTRIES: &str = "shipping_countries";
  pub const ORDERS: &str = "orders";
  pub const CUSTOMERS: &str = "customers";
  pub const UNRECONCILED_CHARGES: &str = "unreconciled_charges";
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Document '{collection}/{id}' not found")]
  NotFound { collection: String, id: String },

  #[error("Document '{collection}/{id}' already exists")]
  AlreadyExists { collection: String, id: String },

  #[error("Document '{collection}/{id}' could not be decoded: {source}")]
  Decode {
    collection: String,
    id: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Document for '{collection}' could not be encoded: {source}")]
  Encode {
    collection: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Document for '{collection}' must be a JSON object")]
  NotAnObject { collection: String },

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// A stored document and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub collection: String,
  pub id: String,
  pub data: Value,
}

impl Document {
  /// Decodes the document body into a typed record.
  pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
    serde_json::from_value(self.data.clone()).map_err(|source| StoreError::Decode {
      collection: self.collection.clone(),
      id: self.id.clone(),
      source,
    })
  }
}

/// One write of a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
  Insert {
    collection: String,
    id: Option<String>,
    data: Value,
  },
  Delete {
    collection: String,
    id: String,
  },
}

/// Writes applied all-or-nothing by [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
  ops: Vec<WriteOp>,
}

impl WriteBatch {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queues an insert. `id: None` lets the store generate one.
  pub fn insert(mut self, collection: &str, id: Option<&str>, data: Value) -> Self {
    self.ops.push(WriteOp::Insert {
      collection: collection.to_string(),
      id: id.map(str::to_string),
      data,
    });
    self
  }

  pub fn delete(mut self, collection: &str, id: &str) -> Self {
    self.ops.push(WriteOp::Delete {
      collection: collection.to_string(),
      id: id.to_string(),
    });
    self
  }

  pub fn ops(&self) -> &[WriteOp] {
    &self.ops
  }

  pub(crate) fn into_ops(self) -> Vec<WriteOp> {
    self.ops
  }
}

/// The operations the storefront needs from a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
  async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

  /// All documents of `collection` whose top-level `field` equals `value`.
  async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Document>>;

  /// Inserts `data` and returns its id, generating a UUID when `id` is `None`.
  async fn insert(&self, collection: &str, id: Option<&str>, data: Value) -> StoreResult<String>;

  /// Merges the top-level fields of `patch` into an existing document.
  async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()>;

  /// Returns whether a document was removed.
  async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

  /// Applies every op of `batch` in one transaction. Returns the ids of the
  /// inserted documents, in batch order.
  async fn commit(&self, batch: WriteBatch) -> StoreResult<Vec<String>>;
}

/// Fetches and decodes a document, `Ok(None)` when it does not exist.
pub async fn get_as<T: DeserializeOwned>(
  store: &dyn DocumentStore,
  collection: &str,
  id: &str,
) -> StoreResult<Option<T>> {
  match store.get(collection, id).await? {
    Some(doc) => doc.decode().map(Some),
    None => Ok(None),
  }
}

/// Decodes the first document of `collection` whose `field` equals `value`.
pub async fn find_first_as<T: DeserializeOwned>(
  store: &dyn DocumentStore,
  collection: &str,
  field: &str,
  value: &Value,
) -> StoreResult<Option<T>> {
  let docs = store.query_eq(collection, field, value).await?;
  match docs.first() {
    Some(doc) => doc.decode().map(Some),
    None => Ok(None),
  }
}

/// Encodes a typed record as a document body for `collection`.
pub fn encode<T: Serialize>(collection: &str, record: &T) -> StoreResult<Value> {
  serde_json::to_value(record).map_err(|source| StoreError::Encode {
    collection: collection.to_string(),
    source,
  })
}

pub(crate) fn new_document_id() -> String {
  uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn ensure_object(collection: &str, data: &Value) -> StoreResult<()> {
  if data.is_object() {
    Ok(())
  } else {
    Err(StoreError::NotAnObject {
      collection: collection.to_string(),
    })
  }
}
