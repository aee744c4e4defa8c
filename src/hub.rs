//! Orquestador principal del hub de aprobaciones.
//! Se encarga de:
//! - Despachar los comandos del protocolo hacia repositorios y máquina de
//!   estados, devolviendo siempre respuestas estructuradas (`ok`/`error`).
//! - Re-armar el programador de recordatorios tras cada cambio de
//!   preferencias y al iniciar un flujo.
//! - Emitir las notificaciones de "flujo iniciado" y "flujo aprobado" (la
//!   de aprobación exactamente en el flanco de transición).
//! - Sembrar plantillas de fábrica y preferencias por defecto en el primer
//!   arranque.
use std::sync::Arc;

use crate::data::{now_millis, Flow, FlowPatch, Preferences, Template};
use crate::errors::{FlowError, StoreError};
use crate::notify::Notifier;
use crate::protocol::{Command, Response};
use crate::repository::{FlowRepository, SettingsRepository};
use crate::storage::RecordStore;
use crate::workflow::{ReminderScheduler, state};

/// Límite por defecto de la consulta de recientes del protocolo.
const DEFAULT_RECENT_LIMIT: usize = 5;

pub struct ApprovalsHub {
    settings: SettingsRepository,
    flows: FlowRepository,
    scheduler: ReminderScheduler,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalsHub {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        let settings = SettingsRepository::new(store.clone());
        let flows = FlowRepository::new(store);
        let scheduler = ReminderScheduler::new(settings.clone(), flows.clone(), notifier.clone());
        Self { settings,
               flows,
               scheduler,
               notifier }
    }

    /// Acceso al programador (para armarlo en el arranque y desarmarlo en
    /// el apagado del proceso).
    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// Siembra de primer arranque: plantillas de fábrica si no hay ninguna
    /// y preferencias por defecto si nunca se guardaron. No pisa datos ya
    /// aprovisionados.
    pub async fn provision_defaults(&self) -> Result<(), StoreError> {
        if self.settings.templates().await?.is_empty() {
            self.settings.set_templates(&Template::stock()).await?;
            eprintln!("[hub] plantillas de fábrica sembradas");
        }
        if !self.settings.prefs_initialized().await? {
            self.settings.set_prefs(&Preferences::default()).await?;
            eprintln!("[hub] preferencias por defecto sembradas");
        }
        Ok(())
    }

    /// Despacho del protocolo. Los errores de entrada y de persistencia se
    /// devuelven como `{ ok: false, error }`, nunca como panic.
    pub async fn dispatch(&self, cmd: Command) -> Response {
        match cmd {
            Command::Ping => Response::Pong { ok: true, ts: now_millis() },

            Command::StartFlow { row_key, template_id } => {
                match self.start_flow(&row_key, &template_id).await {
                    Ok(flow) => Response::Flow { ok: true, flow },
                    Err(e) => Response::error(e),
                }
            }

            Command::GetRecent { limit } => {
                match self.flows.get_recent(limit.unwrap_or(DEFAULT_RECENT_LIMIT)).await {
                    Ok(items) => Response::Recent { ok: true, items },
                    Err(e) => Response::error(e),
                }
            }

            Command::GetPrefs => match self.settings.prefs().await {
                Ok(prefs) => Response::Prefs { ok: true, prefs },
                Err(e) => Response::error(e),
            },

            Command::SetPrefs(prefs) => match self.set_prefs(prefs).await {
                Ok(()) => Response::ack(),
                Err(e) => Response::error(e),
            },

            Command::MarkStageDone { row_key, stage_id } => {
                match self.mark_stage_done(&row_key, &stage_id).await {
                    Ok(flow) => Response::Flow { ok: true, flow },
                    Err(e) => Response::error(e),
                }
            }

            Command::SetFlowStatus { row_key, status } => {
                match self.flows.set_status(&row_key, status).await {
                    Ok(()) => Response::ack(),
                    Err(e) => Response::error(e),
                }
            }
        }
    }

    /// Inicia un flujo sobre una fila: valida plantilla y clave, materializa
    /// la copia profunda de etapas, persiste y re-asegura el timer de
    /// recordatorios (como en cada cambio que puede requerirlo).
    async fn start_flow(&self, row_key: &str, template_id: &str) -> Result<Flow, FlowError> {
        let template = self.settings
                           .find_template(template_id)
                           .await?
                           .ok_or_else(|| FlowError::UnknownTemplate(template_id.to_string()))?;
        let flow = state::materialize_flow(&template, row_key, now_millis())?;
        let flow = self.flows.upsert_flow(FlowPatch::from_flow(&flow)).await?;

        if let Err(e) = self.scheduler.rearm().await {
            eprintln!("[hub] no se pudo re-armar el timer: {e}");
        }
        self.notifier
            .notify("Flujo iniciado",
                    &format!("Plantilla “{}” en fila {}.", template.name, row_key))
            .await;
        Ok(flow)
    }

    /// Marca una etapa y persiste el flujo ya mutado (el arreglo `stages`
    /// completo, por la semántica de merge superficial del repositorio).
    async fn mark_stage_done(&self, row_key: &str, stage_id: &str) -> Result<Flow, FlowError> {
        let flow = self.flows
                       .get_by_key(row_key)
                       .await?
                       .ok_or_else(|| FlowError::FlowNotFound(row_key.to_string()))?;
        let outcome = state::mark_stage_done(flow, stage_id, now_millis())?;
        let flow = self.flows.upsert_flow(FlowPatch::from_flow(&outcome.flow)).await?;

        if outcome.newly_approved {
            self.notifier
                .notify("Flujo aprobado", &format!("Fila {row_key} completada."))
                .await;
        }
        Ok(flow)
    }

    /// Valida la ventana silenciosa (horas 0–23) antes de persistir: una
    /// ventana fuera de rango se rechaza en la frontera y no reemplaza el
    /// registro guardado.
    async fn set_prefs(&self, prefs: Preferences) -> Result<(), FlowError> {
        if let Some(hour) = prefs.quiet_hours.hour_out_of_range() {
            return Err(FlowError::QuietHourOutOfRange(hour));
        }
        self.settings.set_prefs(&prefs).await?;
        self.scheduler.rearm().await?;
        Ok(())
    }
}
