//! Repositorios sobre el Record Store.
//!
//! Responsabilidades clave:
//! - `FlowRepository`: CRUD/merge del diccionario de flujos (un valor JSON
//!   por namespace, keyed por `rowKey`), consulta de recientes por
//!   `updatedAt` y override manual de status.
//! - `SettingsRepository`: plantillas y preferencias como valores completos
//!   del área de ajustes.
//!
//! Concurrencia: cada mutación del diccionario de flujos es un
//! read-modify-write sobre el valor completo del namespace. Para que dos
//! mutaciones concurrentes sobre claves distintas no se pisen (last-writer-
//! wins sobre el diccionario entero), todas las mutaciones se serializan a
//! través de un único `Mutex` sostenido desde la lectura hasta la
//! escritura. Es una garantía explícita, cubierta por test.
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::data::{now_millis, Flow, FlowPatch, FlowStatus, Preferences, Template};
use crate::errors::StoreError;
use crate::storage::{Namespace, RecordStore};

#[derive(Clone)]
pub struct FlowRepository {
    store: Arc<dyn RecordStore>,
    /// Serializa los read-modify-write del diccionario completo de flujos.
    mutation_lock: Arc<Mutex<()>>,
}

impl FlowRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store,
               mutation_lock: Arc::new(Mutex::new(())) }
    }

    /// Diccionario completo de flujos; vacío si el namespace nunca se
    /// escribió. `IndexMap` preserva orden de inserción, lo que hace
    /// determinista el desempate de `get_recent`.
    async fn flows_dict(&self) -> Result<IndexMap<String, Flow>, StoreError> {
        match self.store.read(Namespace::Flows).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(IndexMap::new()),
        }
    }

    async fn write_dict(&self, dict: &IndexMap<String, Flow>) -> Result<(), StoreError> {
        self.store.write(Namespace::Flows, serde_json::to_value(dict)?).await
    }

    /// Merge superficial del parche sobre el registro existente en
    /// `patch.row_key` (o inserción si no existe) y reescritura del
    /// diccionario. Devuelve el registro resultante.
    pub async fn upsert_flow(&self, patch: FlowPatch) -> Result<Flow, StoreError> {
        let _guard = self.mutation_lock.lock().await;
        let mut dict = self.flows_dict().await?;
        let existing = dict.get(&patch.row_key).cloned();
        let merged = patch.apply_to(existing);
        dict.insert(merged.row_key.clone(), merged.clone());
        self.write_dict(&dict).await?;
        Ok(merged)
    }

    pub async fn get_by_key(&self, row_key: &str) -> Result<Option<Flow>, StoreError> {
        Ok(self.flows_dict().await?.get(row_key).cloned())
    }

    /// Los `limit` flujos más recientes por `updatedAt` descendente. El
    /// desempate es el orden de inserción en el diccionario (sort estable).
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<Flow>, StoreError> {
        let dict = self.flows_dict().await?;
        let mut items: Vec<Flow> = dict.into_values().collect();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items.truncate(limit);
        Ok(items)
    }

    /// Override manual de status: no-op si la clave no existe, si existe
    /// sobreescribe `status` y avanza `updatedAt`. Puede desincronizar el
    /// status del estado real de las etapas; es el escape intencional para
    /// intervención manual, no un bug.
    pub async fn set_status(&self, row_key: &str, status: FlowStatus) -> Result<(), StoreError> {
        let _guard = self.mutation_lock.lock().await;
        let mut dict = self.flows_dict().await?;
        if let Some(flow) = dict.get_mut(row_key) {
            flow.status = status;
            flow.updated_at = now_millis();
            self.write_dict(&dict).await?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn RecordStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Plantillas aprovisionadas; lista vacía si nunca se sembraron.
    pub async fn templates(&self) -> Result<Vec<Template>, StoreError> {
        match self.store.read(Namespace::Templates).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn set_templates(&self, templates: &[Template]) -> Result<(), StoreError> {
        self.store.write(Namespace::Templates, serde_json::to_value(templates)?).await
    }

    pub async fn find_template(&self, template_id: &str) -> Result<Option<Template>, StoreError> {
        Ok(self.templates().await?.into_iter().find(|t| t.id == template_id))
    }

    /// Preferencias actuales, con default documentado si nunca se guardaron.
    pub async fn prefs(&self) -> Result<Preferences, StoreError> {
        match self.store.read(Namespace::Prefs).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Preferences::default()),
        }
    }

    /// Reemplazo completo del registro de preferencias (nunca merge).
    pub async fn set_prefs(&self, prefs: &Preferences) -> Result<(), StoreError> {
        self.store.write(Namespace::Prefs, serde_json::to_value(prefs)?).await
    }

    /// `true` si el namespace de preferencias ya fue escrito alguna vez.
    /// Usado por el aprovisionamiento inicial para no pisar ajustes.
    pub async fn prefs_initialized(&self) -> Result<bool, StoreError> {
        Ok(self.store.read(Namespace::Prefs).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FlowStatus, Stage};
    use crate::storage::InMemoryRecordStore;

    fn repo() -> FlowRepository {
        FlowRepository::new(Arc::new(InMemoryRecordStore::new()))
    }

    fn patch(row_key: &str, updated_at: i64) -> FlowPatch {
        FlowPatch { row_key: row_key.to_string(),
                    template_id: Some("compra-menor".to_string()),
                    stages: Some(vec![Stage { id: "jefe".to_string(),
                                              label: "Aprobación Jefe".to_string(),
                                              done: false,
                                              done_at: None }]),
                    status: Some(FlowStatus::Pending),
                    required_columns: Some(vec![]),
                    started_at: Some(updated_at),
                    updated_at: Some(updated_at) }
    }

    #[tokio::test]
    async fn test_upsert_then_get_by_key() {
        let repo = repo();
        repo.upsert_flow(patch("row:1", 100)).await.unwrap();
        let flow = repo.get_by_key("row:1").await.unwrap().expect("existe");
        assert_eq!(flow.template_id, "compra-menor");
        assert!(repo.get_by_key("row:2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_merges_over_existing() {
        let repo = repo();
        repo.upsert_flow(patch("row:1", 100)).await.unwrap();
        let merged = repo.upsert_flow(FlowPatch { row_key: "row:1".to_string(),
                                                  status: Some(FlowStatus::Approved),
                                                  updated_at: Some(200),
                                                  ..Default::default() })
                         .await
                         .unwrap();
        assert_eq!(merged.status, FlowStatus::Approved);
        assert_eq!(merged.updated_at, 200);
        // lo no parcheado sobrevive
        assert_eq!(merged.template_id, "compra-menor");
        assert_eq!(merged.stages.len(), 1);
    }

    #[tokio::test]
    async fn test_get_recent_sorted_desc_and_truncated() {
        let repo = repo();
        repo.upsert_flow(patch("row:a", 100)).await.unwrap();
        repo.upsert_flow(patch("row:b", 200)).await.unwrap();
        repo.upsert_flow(patch("row:c", 150)).await.unwrap();

        let recent = repo.get_recent(2).await.unwrap();
        assert_eq!(recent.iter().map(|f| f.row_key.as_str()).collect::<Vec<_>>(),
                   vec!["row:b", "row:c"]);
    }

    #[tokio::test]
    async fn test_set_status_unknown_key_is_noop() {
        let repo = repo();
        repo.set_status("row:ghost", FlowStatus::Approved).await.unwrap();
        assert!(repo.get_by_key("row:ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status_overwrites_and_bumps_updated_at() {
        let repo = repo();
        repo.upsert_flow(patch("row:1", 100)).await.unwrap();
        repo.set_status("row:1", FlowStatus::Approved).await.unwrap();
        let flow = repo.get_by_key("row:1").await.unwrap().unwrap();
        assert_eq!(flow.status, FlowStatus::Approved);
        assert!(flow.updated_at >= 100);
        // el override no toca las etapas: puede desincronizarlas adrede
        assert!(!flow.stages[0].done);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_do_not_lose_updates() {
        let repo = repo();
        let mut handles = Vec::new();
        for i in 0..25 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert_flow(patch(&format!("row:{i}"), 100 + i)).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        // la serialización por mutex impide el last-writer-wins entre claves
        assert_eq!(repo.get_recent(100).await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_settings_defaults_and_roundtrip() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let settings = SettingsRepository::new(store);

        assert!(settings.templates().await.unwrap().is_empty());
        assert!(!settings.prefs_initialized().await.unwrap());
        assert_eq!(settings.prefs().await.unwrap(), Preferences::default());

        settings.set_templates(&Template::stock()).await.unwrap();
        let found = settings.find_template("viaje").await.unwrap();
        assert_eq!(found.map(|t| t.stages.len()), Some(3));
        assert!(settings.find_template("nope").await.unwrap().is_none());

        let mut prefs = Preferences::default();
        prefs.reminder_every_hours = 2.0;
        settings.set_prefs(&prefs).await.unwrap();
        assert_eq!(settings.prefs().await.unwrap(), prefs);
        assert!(settings.prefs_initialized().await.unwrap());
    }
}
