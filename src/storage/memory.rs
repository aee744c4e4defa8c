//! Record Store en memoria (rápido para tests y prototipos).
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Namespace, RecordStore};
use crate::errors::StoreError;

#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    namespaces: Arc<RwLock<HashMap<&'static str, Value>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read(&self, ns: Namespace) -> Result<Option<Value>, StoreError> {
        let guard = self.namespaces.read().await;
        Ok(guard.get(ns.key()).cloned())
    }

    async fn write(&self, ns: Namespace, value: Value) -> Result<(), StoreError> {
        let mut guard = self.namespaces.write().await;
        guard.insert(ns.key(), value);
        Ok(())
    }
}
