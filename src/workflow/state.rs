//! Máquina de estados de un flujo (lógica pura, sin persistencia).
//!
//! Dos estados: `PENDING` y `APPROVED`. La transición `PENDING -> APPROVED`
//! ocurre al completar la última etapa pendiente; no hay transición de
//! vuelta salvo el override manual del repositorio. El invariante que esta
//! máquina mantiene tras cada mutación: `status == APPROVED` sí y sólo sí
//! toda etapa está `done`.
use crate::data::{Flow, FlowStatus, Stage, Template};
use crate::errors::FlowError;

/// Resultado de marcar una etapa.
#[derive(Debug)]
pub struct MarkOutcome {
    pub flow: Flow,
    /// Completitud actual del flujo (todas las etapas `done`), sea o no
    /// consecuencia de esta llamada.
    pub all_done: bool,
    /// `true` sólo cuando ESTA llamada causó la transición a `APPROVED`.
    /// El llamador dispara la notificación de aprobación exactamente en ese
    /// flanco, nunca en llamadas repetidas sobre un flujo ya completo.
    pub newly_approved: bool,
}

/// Materializa un flujo nuevo desde una plantilla: copia profunda de las
/// etapas (ediciones posteriores de la plantilla no alteran flujos en
/// curso), status inicial siempre `PENDING`.
///
/// Una plantilla sin etapas se rechaza: dejaría el flujo "vacuamente
/// completo" y el invariante de status perdería sentido.
pub fn materialize_flow(template: &Template, row_key: &str, now: i64) -> Result<Flow, FlowError> {
    if row_key.is_empty() {
        return Err(FlowError::EmptyRowKey);
    }
    if template.stages.is_empty() {
        return Err(FlowError::TemplateWithoutStages(template.id.clone()));
    }
    Ok(Flow { row_key: row_key.to_string(),
              template_id: template.id.clone(),
              stages: template.stages
                              .iter()
                              .map(|s| Stage { id: s.id.clone(),
                                               label: s.label.clone(),
                                               done: false,
                                               done_at: None })
                              .collect(),
              status: FlowStatus::Pending,
              required_columns: template.required_columns.clone(),
              started_at: now,
              updated_at: now })
}

/// Marca una etapa como completa.
/// - Etapa desconocida: error.
/// - Etapa ya completa: idempotente, sin cambios de timestamps;
///   `newly_approved` queda en `false`.
/// - En otro caso: `done = true`, `doneAt = now`, `updatedAt = now` y
///   recomputación del status derivado.
pub fn mark_stage_done(mut flow: Flow, stage_id: &str, now: i64) -> Result<MarkOutcome, FlowError> {
    let was_complete = flow.all_stages_done();

    let stage = flow.stages
                    .iter_mut()
                    .find(|s| s.id == stage_id)
                    .ok_or_else(|| FlowError::UnknownStage(stage_id.to_string()))?;

    if !stage.done {
        stage.done = true;
        stage.done_at = Some(now);
        flow.updated_at = now;
    }

    let all_done = flow.all_stages_done();
    if all_done {
        flow.status = FlowStatus::Approved;
    }

    Ok(MarkOutcome { all_done,
                     newly_approved: all_done && !was_complete,
                     flow })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template::stock().into_iter().find(|t| t.id == "compra-menor").unwrap()
    }

    #[test]
    fn test_materialize_copies_stages_pending() {
        let flow = materialize_flow(&template(), "row:1", 1000).expect("crea");
        assert_eq!(flow.status, FlowStatus::Pending);
        assert_eq!(flow.stages.len(), 2);
        assert!(flow.stages.iter().all(|s| !s.done && s.done_at.is_none()));
        assert_eq!(flow.started_at, 1000);
        assert_eq!(flow.updated_at, 1000);
        assert_eq!(flow.required_columns.len(), 5);
    }

    #[test]
    fn test_materialize_is_deep_copy() {
        let mut tpl = template();
        let flow = materialize_flow(&tpl, "row:1", 1000).unwrap();
        // editar la plantilla después no toca el flujo ya materializado
        tpl.stages[0].label = "Otra cosa".to_string();
        assert_eq!(flow.stages[0].label, "Aprobación Jefe");
    }

    #[test]
    fn test_materialize_rejects_empty_row_key() {
        assert!(matches!(materialize_flow(&template(), "", 0), Err(FlowError::EmptyRowKey)));
    }

    #[test]
    fn test_materialize_rejects_template_without_stages() {
        let tpl = Template { id: "vacia".to_string(),
                             name: "Vacía".to_string(),
                             stages: vec![],
                             required_columns: vec![] };
        assert!(matches!(materialize_flow(&tpl, "row:1", 0),
                         Err(FlowError::TemplateWithoutStages(_))));
    }

    #[test]
    fn test_mark_unknown_stage_fails() {
        let flow = materialize_flow(&template(), "row:1", 1000).unwrap();
        assert!(matches!(mark_stage_done(flow, "gerencia", 2000),
                         Err(FlowError::UnknownStage(_))));
    }

    #[test]
    fn test_full_scenario_compra_menor() {
        let flow = materialize_flow(&template(), "row:1", 1000).unwrap();

        let first = mark_stage_done(flow, "jefe", 2000).unwrap();
        assert_eq!(first.flow.status, FlowStatus::Pending);
        assert!(!first.all_done);
        assert!(!first.newly_approved);
        assert_eq!(first.flow.stages[0].done_at, Some(2000));
        assert_eq!(first.flow.updated_at, 2000);

        let second = mark_stage_done(first.flow, "finanzas", 3000).unwrap();
        assert_eq!(second.flow.status, FlowStatus::Approved);
        assert!(second.all_done);
        assert!(second.newly_approved);
        // invariante: APPROVED sí y sólo sí todas done
        assert!(second.flow.all_stages_done());
    }

    #[test]
    fn test_mark_done_is_idempotent() {
        let flow = materialize_flow(&template(), "row:1", 1000).unwrap();
        let once = mark_stage_done(flow, "jefe", 2000).unwrap();
        let twice = mark_stage_done(once.flow.clone(), "jefe", 9999).unwrap();
        // sin cambios de estado ni timestamps en la repetición
        assert_eq!(twice.flow, once.flow);
        assert!(!twice.newly_approved);
    }

    #[test]
    fn test_transition_edge_fires_at_most_once() {
        let flow = materialize_flow(&template(), "row:1", 1000).unwrap();
        let a = mark_stage_done(flow, "jefe", 2000).unwrap();
        let b = mark_stage_done(a.flow, "finanzas", 3000).unwrap();
        assert!(b.newly_approved);

        // repetir la última etapa: sigue completo pero sin flanco
        let c = mark_stage_done(b.flow, "finanzas", 4000).unwrap();
        assert!(c.all_done);
        assert!(!c.newly_approved);

        let d = mark_stage_done(c.flow, "jefe", 5000).unwrap();
        assert!(d.all_done);
        assert!(!d.newly_approved);
    }
}
