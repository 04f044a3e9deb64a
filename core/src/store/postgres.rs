// storefront/src/store/postgres.rs

use super::{ensure_object, new_document_id, Document, DocumentStore, StoreError, StoreResult, WriteBatch, WriteOp};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use tracing::{debug, info, instrument};

const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
  collection TEXT NOT NULL,
  id TEXT NOT NULL,
  data JSONB NOT NULL,
  created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
  PRIMARY KEY (collection, id)
)"#;

/// Document store on a single Postgres `documents` table with JSONB bodies.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
  pool: PgPool,
}

impl PgDocumentStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    info!("Connected to the document database.");
    Ok(Self::new(pool))
  }

  /// Creates the `documents` table when missing.
  pub async fn ensure_schema(&self) -> StoreResult<()> {
    sqlx::query(CREATE_DOCUMENTS_TABLE).execute(&self.pool).await?;
    Ok(())
  }
}

async fn insert_one<'e, E>(executor: E, collection: &str, id: &str, data: &Value) -> StoreResult<()>
where
  E: Executor<'e, Database = Postgres>,
{
  let result = sqlx::query(
    "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3) ON CONFLICT (collection, id) DO NOTHING",
  )
  .bind(collection)
  .bind(id)
  .bind(Json(data))
  .execute(executor)
  .await?;
  if result.rows_affected() == 0 {
    return Err(StoreError::AlreadyExists {
      collection: collection.to_string(),
      id: id.to_string(),
    });
  }
  Ok(())
}

async fn delete_one<'e, E>(executor: E, collection: &str, id: &str) -> StoreResult<bool>
where
  E: Executor<'e, Database = Postgres>,
{
  let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
    .bind(collection)
    .bind(id)
    .execute(executor)
    .await?;
  Ok(result.rows_affected() > 0)
}

fn to_document(collection: &str, (id, Json(data)): (String, Json<Value>)) -> Document {
  Document {
    collection: collection.to_string(),
    id,
    data,
  }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
  #[instrument(skip(self), err)]
  async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
    let row: Option<(String, Json<Value>)> =
      sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(row.map(|row| to_document(collection, row)))
  }

  #[instrument(skip(self, value), err)]
  async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Document>> {
    let rows: Vec<(String, Json<Value>)> =
      sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 AND data -> $2 = $3 ORDER BY id")
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;
    Ok(rows.into_iter().map(|row| to_document(collection, row)).collect())
  }

  #[instrument(skip(self, data), err)]
  async fn insert(&self, collection: &str, id: Option<&str>, data: Value) -> StoreResult<String> {
    ensure_object(collection, &data)?;
    let id = id.map_or_else(new_document_id, str::to_string);
    insert_one(&self.pool, collection, &id, &data).await?;
    Ok(id)
  }

  #[instrument(skip(self, patch), err)]
  async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
    ensure_object(collection, &patch)?;
    let result = sqlx::query("UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2")
      .bind(collection)
      .bind(id)
      .bind(Json(&patch))
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      });
    }
    Ok(())
  }

  #[instrument(skip(self), err)]
  async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
    delete_one(&self.pool, collection, id).await
  }

  #[instrument(skip_all, fields(ops = batch.ops().len()), err)]
  async fn commit(&self, batch: WriteBatch) -> StoreResult<Vec<String>> {
    let mut tx = self.pool.begin().await?;
    let mut inserted = Vec::new();
    for op in batch.into_ops() {
      match op {
        WriteOp::Insert { collection, id, data } => {
          ensure_object(&collection, &data)?;
          let id = id.unwrap_or_else(new_document_id);
          // Dropping `tx` on an early return rolls the whole batch back.
          insert_one(&mut *tx, &collection, &id, &data).await?;
          inserted.push(id);
        }
        WriteOp::Delete { collection, id } => {
          delete_one(&mut *tx, &collection, &id).await?;
        }
      }
    }
    tx.commit().await?;
    debug!(inserted = inserted.len(), "Document batch committed.");
    Ok(inserted)
  }
}
