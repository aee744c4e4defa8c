//! Record Store: persistencia genérica por namespaces.
//! Cada namespace es un único valor JSON que se lee y reemplaza completo
//! (el namespace `flows` contiene el diccionario entero de flujos). Aquí no
//! hay lógica de negocio: los defaults por namespace los aplica el
//! repositorio al encontrar `None`.
//!
//! Implementaciones:
//! - `InMemoryRecordStore`: mapa bajo `RwLock`, para tests y prototipos.
//! - `JsonFileRecordStore`: un archivo JSON por namespace, escritura
//!   atómica vía archivo temporal + rename.

pub mod file;
pub mod memory;

pub use file::JsonFileRecordStore;
pub use memory::InMemoryRecordStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;

/// Namespaces persistidos. `Templates` y `Prefs` forman el área de ajustes
/// del usuario; `Flows` es el diccionario por fila.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Templates,
    Prefs,
    Flows,
}

impl Namespace {
    pub fn key(&self) -> &'static str {
        match self {
            Namespace::Templates => "templates",
            Namespace::Prefs => "prefs",
            Namespace::Flows => "flows",
        }
    }
}

/// Contrato mínimo de persistencia: lectura devuelve `None` si el namespace
/// nunca se escribió; escritura reemplaza el valor completo.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read(&self, ns: Namespace) -> Result<Option<Value>, StoreError>;
    async fn write(&self, ns: Namespace, value: Value) -> Result<(), StoreError>;
}
