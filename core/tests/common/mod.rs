// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storefront::models::{CardDetails, CartRequest, PostalAddress};
use storefront::payment::MockPaymentProcessor;
use storefront::store::{collections, Document, DocumentStore, MemoryStore, StoreError, StoreResult, WriteBatch};
use storefront::{CheckoutService, CheckoutSettings};
use tracing::Level;

// --- Catalog fixture ---
//
// price-a: 100, in stock, active product "Linen shirt"
// price-b: 100 discounted to 80, in stock, active product "Wool scarf"
// price-sold-out: quantity 0
// price-inactive: belongs to an inactive product
// price-orphan: references a product that does not exist
// Shipping: "se" (Sweden, fee 20), "no" (Norway, fee 50)
// Promotions: TENOFF 10%, FIFTY 50 off, COMBO 20 off + 10%, HUGE 150%, BIG 1000 off

pub fn seeded_store() -> Arc<MemoryStore> {
  let store = MemoryStore::new();

  store.seed(collections::PRODUCTS, "prod-shirt", product("Linen shirt", 1001, 1));
  store.seed(collections::PRODUCTS, "prod-scarf", product("Wool scarf", 1002, 1));
  store.seed(collections::PRODUCTS, "prod-retired", product("Retired jacket", 1003, 0));

  store.seed(collections::PRICES, "price-a", price(json!(100), Value::Null, 5, "prod-shirt"));
  store.seed(collections::PRICES, "price-b", price(json!(100), json!(80), 2, "prod-scarf"));
  store.seed(collections::PRICES, "price-sold-out", price(json!(100), Value::Null, 0, "prod-shirt"));
  store.seed(collections::PRICES, "price-inactive", price(json!(60), Value::Null, 9, "prod-retired"));
  store.seed(collections::PRICES, "price-orphan", price(json!(40), Value::Null, 9, "prod-missing"));

  store.seed(
    collections::SHIPPING_COUNTRIES,
    "se",
    json!({ "name": "Sweden", "code": "SE", "fee": 20 }),
  );
  store.seed(
    collections::SHIPPING_COUNTRIES,
    "no",
    json!({ "name": "Norway", "code": "NO", "fee": 50 }),
  );

  store.seed(collections::PROMOTION_CODES, "promo-1", json!({ "code": "TENOFF", "percent_off": 10 }));
  store.seed(collections::PROMOTION_CODES, "promo-2", json!({ "code": "FIFTY", "amount_off": 50 }));
  store.seed(
    collections::PROMOTION_CODES,
    "promo-3",
    json!({ "code": "COMBO", "amount_off": 20, "percent_off": 10 }),
  );
  store.seed(collections::PROMOTION_CODES, "promo-4", json!({ "code": "HUGE", "percent_off": 150 }));
  store.seed(collections::PROMOTION_CODES, "promo-5", json!({ "code": "BIG", "amount_off": 1000 }));

  Arc::new(store)
}

fn product(name: &str, article_number: i64, active: i64) -> Value {
  json!({ "name": name, "articleNumber": article_number, "description": null, "active": active })
}

fn price(price: Value, discounted: Value, quantity: i64, product_id: &str) -> Value {
  json!({
    "price": price,
    "discounted_price": discounted,
    "size": "M",
    "quantity": quantity,
    "productID": product_id,
  })
}

pub fn cart(product_ids: &[&str]) -> CartRequest {
  CartRequest {
    name: "Astrid Lind".to_string(),
    email: "astrid@example.com".to_string(),
    phone: "+46700000000".to_string(),
    address: PostalAddress {
      line1: "Storgatan 1".to_string(),
      line2: None,
      postal_code: "111 22".to_string(),
      city: "Stockholm".to_string(),
      state: None,
      country: "se".to_string(),
    },
    card: CardDetails {
      number: "4242424242424242".to_string(),
      exp_month: 12,
      exp_year: 2030,
      cvc: "123".to_string(),
    },
    promotion_code: None,
    product_ids: product_ids.iter().map(|id| id.to_string()).collect(),
  }
}

pub fn cart_with_code(product_ids: &[&str], code: &str) -> CartRequest {
  CartRequest {
    promotion_code: Some(code.to_string()),
    ..cart(product_ids)
  }
}

pub fn service(store: Arc<dyn DocumentStore>, payments: Arc<MockPaymentProcessor>) -> CheckoutService {
  CheckoutService::new(store, payments, CheckoutSettings::default())
}

/// Delegates to a `MemoryStore` but can be told to fail every `commit`.
pub struct FailingCommitStore {
  pub inner: Arc<MemoryStore>,
  pub fail_commits: AtomicBool,
}

impl FailingCommitStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      fail_commits: AtomicBool::new(true),
    }
  }
}

#[async_trait]
impl DocumentStore for FailingCommitStore {
  async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
    self.inner.get(collection, id).await
  }

  async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Document>> {
    self.inner.query_eq(collection, field, value).await
  }

  async fn insert(&self, collection: &str, id: Option<&str>, data: Value) -> StoreResult<String> {
    self.inner.insert(collection, id, data).await
  }

  async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
    self.inner.update(collection, id, patch).await
  }

  async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
    self.inner.delete(collection, id).await
  }

  async fn commit(&self, batch: WriteBatch) -> StoreResult<Vec<String>> {
    if self.fail_commits.load(Ordering::SeqCst) {
      return Err(StoreError::AlreadyExists {
        collection: collections::ORDERS.to_string(),
        id: "simulated".to_string(),
      });
    }
    self.inner.commit(batch).await
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
