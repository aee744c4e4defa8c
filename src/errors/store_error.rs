use thiserror::Error;

/// Errores de la capa de persistencia (Record Store).
/// Se propagan al llamador como fallos estructurados en lugar de
/// silenciarse: un backend caído debe ser visible en la respuesta.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de serialización: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Error de persistencia: {0}")]
    Backend(String),
}
