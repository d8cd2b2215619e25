//! In-memory repository that counts every call, for controller and gate
//! tests.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use meetup_core::{Error, Result, repository::Repository};
use serde_json::Value;

pub struct MockRepo<C, U = C> {
  rows:          Mutex<HashMap<String, Value>>,
  pub created:   Mutex<Vec<C>>,
  pub updated:   Mutex<Vec<(String, U)>>,
  pub reads:     AtomicUsize,
  pub mutations: AtomicUsize,
}

impl<C, U> MockRepo<C, U> {
  pub fn new() -> Self {
    Self {
      rows:      Mutex::new(HashMap::new()),
      created:   Mutex::new(Vec::new()),
      updated:   Mutex::new(Vec::new()),
      reads:     AtomicUsize::new(0),
      mutations: AtomicUsize::new(0),
    }
  }

  pub fn with_row(self, id: &str, row: Value) -> Self {
    self.put(id, row);
    self
  }

  pub fn put(&self, id: &str, row: Value) {
    self.rows.lock().unwrap().insert(id.to_string(), row);
  }

  pub fn reads(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  pub fn mutations(&self) -> usize { self.mutations.load(Ordering::SeqCst) }
}

impl<C, U> Repository for MockRepo<C, U>
where
  C: Clone + Send + Sync + 'static,
  U: Clone + Send + Sync + 'static,
{
  type Entity = Value;
  type Create = C;
  type Update = U;

  async fn read_all(&self) -> Result<Vec<Value>> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.rows.lock().unwrap().values().cloned().collect())
  }

  async fn read_by_id(&self, id: &str) -> Result<Value> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    self
      .rows
      .lock()
      .unwrap()
      .get(id)
      .cloned()
      .ok_or_else(|| Error::not_found("Resource", id))
  }

  async fn create(&self, input: C) -> Result<Value> {
    self.mutations.fetch_add(1, Ordering::SeqCst);
    self.created.lock().unwrap().push(input);
    let id = format!("r{}", self.mutations());
    let row = serde_json::json!({ "id": id });
    self.put(&id, row.clone());
    Ok(row)
  }

  async fn update(&self, id: &str, patch: U) -> Result<Value> {
    let row = self
      .rows
      .lock()
      .unwrap()
      .get(id)
      .cloned()
      .ok_or_else(|| Error::not_found("Resource", id))?;
    self.mutations.fetch_add(1, Ordering::SeqCst);
    self.updated.lock().unwrap().push((id.to_string(), patch));
    Ok(row)
  }

  async fn delete(&self, id: &str) -> Result<Value> {
    let row = self
      .rows
      .lock()
      .unwrap()
      .remove(id)
      .ok_or_else(|| Error::not_found("Resource", id))?;
    self.mutations.fetch_add(1, Ordering::SeqCst);
    Ok(row)
  }
}
