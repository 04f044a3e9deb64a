// storefront_server/src/seed.rs

//! Loads catalog documents into the store at startup.

use anyhow::Context;
use serde_json::{Map, Value};
use std::path::Path;
use storefront::store::{DocumentStore, StoreError};
use tracing::{debug, info};

/// Inserts every document of a `{ collection: { id: document } }` JSON object.
///
/// Documents whose id is already taken are left untouched, so seeding an
/// existing database is harmless. Returns the number of documents written.
pub async fn seed_catalog(store: &dyn DocumentStore, catalog: Value) -> anyhow::Result<usize> {
  let Value::Object(collections) = catalog else {
    anyhow::bail!("catalog seed must be a JSON object of collections");
  };

  let mut written = 0;
  for (collection, documents) in collections {
    let documents: Map<String, Value> = match documents {
      Value::Object(documents) => documents,
      _ => anyhow::bail!("collection '{collection}' must map document ids to documents"),
    };
    for (id, data) in documents {
      match store.insert(&collection, Some(&id), data).await {
        Ok(_) => written += 1,
        Err(StoreError::AlreadyExists { .. }) => debug!(%collection, %id, "Seed document already present."),
        Err(e) => return Err(e).with_context(|| format!("seeding {collection}/{id}")),
      }
    }
  }
  info!(written, "Catalog seeded.");
  Ok(written)
}

pub async fn seed_catalog_file(store: &dyn DocumentStore, path: &Path) -> anyhow::Result<usize> {
  let raw = tokio::fs::read(path)
    .await
    .with_context(|| format!("reading catalog seed file {}", path.display()))?;
  let catalog: Value =
    serde_json::from_slice(&raw).with_context(|| format!("parsing catalog seed file {}", path.display()))?;
  seed_catalog(store, catalog).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use storefront::store::MemoryStore;

  #[tokio::test]
  async fn seeding_twice_keeps_existing_documents() {
    let store = MemoryStore::new();
    let catalog = json!({
      "shipping_countries": { "se": { "name": "Sweden", "code": "SE", "fee": 20 } },
      "products": { "prod-1": { "name": "Shirt", "active": 1 } },
    });

    assert_eq!(seed_catalog(&store, catalog.clone()).await.unwrap(), 2);
    assert_eq!(seed_catalog(&store, catalog).await.unwrap(), 0);
    assert_eq!(store.count("products"), 1);
  }

  #[tokio::test]
  async fn collections_must_be_objects() {
    let store = MemoryStore::new();
    assert!(seed_catalog(&store, json!({ "products": [1, 2] })).await.is_err());
  }
}
