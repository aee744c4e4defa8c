//! Plantillas de flujos de aprobación.
//! Una plantilla define la lista ordenada de etapas que cada flujo copiará
//! al crearse, más metadatos advisorios sobre columnas esperadas en el
//! documento externo. Las plantillas se aprovisionan al instalar y son de
//! sólo lectura después.
use serde::{Deserialize, Serialize};

/// Etapa declarada en una plantilla (sin estado de completitud).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStage {
    /// Identificador único dentro de la plantilla.
    pub id: String,
    /// Etiqueta para mostrar en UI.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Etapas en orden significativo (orden de despliegue y, por convención,
    /// de completitud; no se fuerza).
    pub stages: Vec<TemplateStage>,
    /// Columnas del documento externo esperadas para este tipo de flujo.
    /// Metadato advisorio: aquí no se valida contra el documento.
    #[serde(default)]
    pub required_columns: Vec<String>,
}

impl Template {
    /// Plantillas de fábrica sembradas en el primer arranque.
    pub fn stock() -> Vec<Template> {
        vec![Template { id: "compra-menor".to_string(),
                        name: "Compra menor".to_string(),
                        stages: vec![TemplateStage { id: "jefe".to_string(),
                                                     label: "Aprobación Jefe".to_string() },
                                     TemplateStage { id: "finanzas".to_string(),
                                                     label: "Aprobación Finanzas".to_string() }],
                        required_columns: vec!["Firma Jefe".to_string(),
                                               "Fecha Aprobación Jefe".to_string(),
                                               "Firma Finanzas".to_string(),
                                               "Fecha Aprobación Finanzas".to_string(),
                                               "Estado General".to_string()] },
             Template { id: "viaje".to_string(),
                        name: "Viaje".to_string(),
                        stages: vec![TemplateStage { id: "jefe".to_string(),
                                                     label: "Aprobación Jefe".to_string() },
                                     TemplateStage { id: "rrhh".to_string(),
                                                     label: "Aprobación RR.HH.".to_string() },
                                     TemplateStage { id: "finanzas".to_string(),
                                                     label: "Aprobación Finanzas".to_string() }],
                        required_columns: vec!["Estado General".to_string()] }]
    }
}
