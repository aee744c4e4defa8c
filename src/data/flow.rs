//! Modelo de flujos de aprobación por fila.
//! Un `Flow` es la instanciación de una plantilla sobre una fila concreta
//! del documento externo: copia profunda de las etapas al momento de
//! creación (ediciones posteriores de la plantilla no alteran flujos en
//! curso) más el estado de completitud y el status derivado.
//!
//! También define `FlowPatch`, el parche de merge superficial que usa el
//! repositorio: los campos presentes sobreescriben, los ausentes se
//! preservan del registro existente; colecciones anidadas (`stages`) se
//! reemplazan completas, nunca se mezclan elemento a elemento.
use serde::{Deserialize, Serialize};

/// Estado derivado de un flujo. `Approved` sólo cuando toda etapa está
/// completa (salvo el override manual de status, documentado aparte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "APPROVED")]
    Approved,
}

/// Etapa de un flujo con su estado de completitud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub label: String,
    pub done: bool,
    /// Milisegundos desde epoch; `None` mientras la etapa no esté completa.
    pub done_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    /// Clave opaca y estable de la fila externa; clave primaria del
    /// diccionario de flujos.
    pub row_key: String,
    pub template_id: String,
    /// Copia profunda de las etapas de la plantilla al crear el flujo.
    /// La identidad y el orden no cambian después de la creación.
    pub stages: Vec<Stage>,
    pub status: FlowStatus,
    #[serde(default)]
    pub required_columns: Vec<String>,
    pub started_at: i64,
    /// No-decreciente entre mutaciones del mismo flujo.
    pub updated_at: i64,
}

impl Flow {
    pub fn all_stages_done(&self) -> bool {
        self.stages.iter().all(|s| s.done)
    }

    /// Filtro del recordatorio: sigue pendiente y tiene trabajo real.
    pub fn awaiting_signatures(&self) -> bool {
        self.status == FlowStatus::Pending && self.stages.iter().any(|s| !s.done)
    }
}

/// Parche de merge superficial sobre el diccionario de flujos.
/// `row_key` es obligatorio (identifica el registro); el resto de campos
/// sólo sobreescriben si están presentes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPatch {
    pub row_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FlowStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl FlowPatch {
    /// Parche completo a partir de un flujo ya mutado (caso típico: el
    /// llamador cambió una etapa y reenvía el arreglo `stages` entero).
    pub fn from_flow(flow: &Flow) -> Self {
        Self { row_key: flow.row_key.clone(),
               template_id: Some(flow.template_id.clone()),
               stages: Some(flow.stages.clone()),
               status: Some(flow.status),
               required_columns: Some(flow.required_columns.clone()),
               started_at: Some(flow.started_at),
               updated_at: Some(flow.updated_at) }
    }

    /// Merge superficial: aplica el parche sobre el registro existente o,
    /// si no hay, sobre un esqueleto vacío con la misma `row_key`.
    pub fn apply_to(self, existing: Option<Flow>) -> Flow {
        let base = existing.unwrap_or(Flow { row_key: self.row_key.clone(),
                                             template_id: String::new(),
                                             stages: Vec::new(),
                                             status: FlowStatus::Pending,
                                             required_columns: Vec::new(),
                                             started_at: 0,
                                             updated_at: 0 });
        Flow { row_key: self.row_key,
               template_id: self.template_id.unwrap_or(base.template_id),
               stages: self.stages.unwrap_or(base.stages),
               status: self.status.unwrap_or(base.status),
               required_columns: self.required_columns.unwrap_or(base.required_columns),
               started_at: self.started_at.unwrap_or(base.started_at),
               updated_at: self.updated_at.unwrap_or(base.updated_at) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_flow() -> Flow {
        Flow { row_key: "row:1".to_string(),
               template_id: "compra-menor".to_string(),
               stages: vec![Stage { id: "jefe".to_string(),
                                    label: "Aprobación Jefe".to_string(),
                                    done: false,
                                    done_at: None },
                            Stage { id: "finanzas".to_string(),
                                    label: "Aprobación Finanzas".to_string(),
                                    done: true,
                                    done_at: Some(50) }],
               status: FlowStatus::Pending,
               required_columns: vec!["Estado General".to_string()],
               started_at: 10,
               updated_at: 50 }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(FlowStatus::Pending).unwrap(), "PENDING");
        assert_eq!(serde_json::to_value(FlowStatus::Approved).unwrap(), "APPROVED");
    }

    #[test]
    fn test_flow_wire_names() {
        let json = serde_json::to_value(sample_flow()).expect("serializa");
        assert!(json.get("rowKey").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json["stages"][1].get("doneAt").is_some());
    }

    #[test]
    fn test_awaiting_signatures() {
        let mut flow = sample_flow();
        assert!(flow.awaiting_signatures());
        for st in &mut flow.stages {
            st.done = true;
        }
        // pendiente sin etapas incompletas ya no cuenta para recordatorios
        assert!(!flow.awaiting_signatures());
        flow.stages[0].done = false;
        flow.status = FlowStatus::Approved;
        assert!(!flow.awaiting_signatures());
    }

    #[test]
    fn test_patch_preserves_absent_fields() {
        let existing = sample_flow();
        let patch = FlowPatch { row_key: "row:1".to_string(),
                                status: Some(FlowStatus::Approved),
                                updated_at: Some(99),
                                ..Default::default() };
        let merged = patch.apply_to(Some(existing.clone()));
        assert_eq!(merged.status, FlowStatus::Approved);
        assert_eq!(merged.updated_at, 99);
        // campos ausentes se preservan del registro previo
        assert_eq!(merged.template_id, existing.template_id);
        assert_eq!(merged.stages, existing.stages);
        assert_eq!(merged.started_at, existing.started_at);
    }

    #[test]
    fn test_patch_replaces_stages_wholesale() {
        let existing = sample_flow();
        let nuevo = vec![Stage { id: "jefe".to_string(),
                                 label: "Aprobación Jefe".to_string(),
                                 done: true,
                                 done_at: Some(70) }];
        let patch = FlowPatch { row_key: "row:1".to_string(),
                                stages: Some(nuevo.clone()),
                                ..Default::default() };
        let merged = patch.apply_to(Some(existing));
        assert_eq!(merged.stages, nuevo);
    }

    #[test]
    fn test_patch_on_missing_record_becomes_record() {
        let full = FlowPatch::from_flow(&sample_flow());
        let merged = full.apply_to(None);
        assert_eq!(merged, sample_flow());
    }
}
