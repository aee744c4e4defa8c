use thiserror::Error;

use super::store_error::StoreError;

/// Errores del dominio de flujos de aprobación.
/// Los comandos mutantes los devuelven como `{ ok: false, error }` en el
/// protocolo; nunca como un panic.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Plantilla desconocida: {0}")]
    UnknownTemplate(String),
    #[error("Plantilla sin etapas: {0}")]
    TemplateWithoutStages(String),
    #[error("Clave de fila vacía")]
    EmptyRowKey,
    #[error("Flow no encontrado: {0}")]
    FlowNotFound(String),
    #[error("Etapa inválida: {0}")]
    UnknownStage(String),
    #[error("Hora silenciosa fuera de rango: {0}")]
    QuietHourOutOfRange(u8),
    #[error(transparent)]
    Store(#[from] StoreError),
}
