//! Record Store respaldado en archivos JSON.
//! Un archivo por namespace dentro del directorio de datos configurado.
//! La escritura serializa al archivo temporal `<ns>.json.tmp` y hace rename
//! para que una caída a mitad de escritura no deje un namespace corrupto.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{Namespace, RecordStore};
use crate::errors::StoreError;

pub struct JsonFileRecordStore {
    dir: PathBuf,
}

impl JsonFileRecordStore {
    /// Crea el store sobre `dir`, creando el directorio si no existe.
    pub fn new(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    fn path_for(&self, ns: Namespace) -> PathBuf {
        self.dir.join(format!("{}.json", ns.key()))
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn read(&self, ns: Namespace) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(ns);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, ns: Namespace, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(ns);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&value)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
