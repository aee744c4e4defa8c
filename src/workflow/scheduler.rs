//! Programador de recordatorios.
//!
//! Dos responsabilidades separadas:
//! - Decidir CUÁNDO despertar: cadencia periódica `max(15 min,
//!   reminderEveryHours * 60)`, primer despertar a "ahora + 1 minuto".
//! - Decidir SI notificar en un despertar dado: re-chequeo defensivo de
//!   `remindersEnabled`, supresión por horas silenciosas (con ventana que
//!   puede envolver la medianoche) y conteo de flujos pendientes entre los
//!   50 más recientes.
//!
//! El timer activo es estado de proceso con ciclo de vida definido: se
//! inicializa en el arranque, `rearm` lo reemplaza atómicamente (abortando
//! la tarea previa, nunca conviven dos) y `shutdown` lo desarma.
use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::data::{Flow, Preferences, QuietHours};
use crate::errors::StoreError;
use crate::notify::Notifier;
use crate::repository::{FlowRepository, SettingsRepository};

/// Cadencia efectiva mínima: 15 minutos. Valores configurados menores se
/// clampean, no se rechazan.
pub const MIN_PERIOD_MINUTES: f64 = 15.0;
/// Retardo del primer despertar tras armar el timer.
pub const FIRST_WAKE_DELAY: Duration = Duration::from_secs(60);
/// Cota de flujos consultados por despertar. Aproximación aceptada: un
/// pendiente muy antiguo deja de recordarse cuando existen 50 más nuevos.
pub const RECENT_SCAN_LIMIT: usize = 50;

/// Cadencia efectiva en minutos ya clampeada.
pub fn effective_period_minutes(prefs: &Preferences) -> f64 {
    (prefs.reminder_every_hours * 60.0).max(MIN_PERIOD_MINUTES)
}

/// ¿Cae `hour` dentro de la ventana silenciosa?
/// Ventana normal (`from < to`): `[from, to)`. Ventana que envuelve la
/// medianoche (`from >= to`, ej. 22 → 7): `hour >= from || hour < to`.
pub fn within_quiet_window(hour: u32, window: &QuietHours) -> bool {
    let (from, to) = (u32::from(window.from), u32::from(window.to));
    if from < to {
        hour >= from && hour < to
    } else {
        hour >= from || hour < to
    }
}

/// Flujos que aún esperan firmas dentro del lote consultado.
pub fn pending_reminder_count(recent: &[Flow]) -> usize {
    recent.iter().filter(|f| f.awaiting_signatures()).count()
}

/// Qué decidió un despertar concreto (útil para logs y tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// Recordatorios deshabilitados (el timer no debería existir; chequeo
    /// defensivo por si el despertar llegó igual).
    Disabled,
    /// Hora dentro de la ventana silenciosa: se suprime esta notificación.
    /// El siguiente despertar ya está programado por el timer periódico.
    Quiet,
    /// Nada pendiente: no se emite notificación.
    NothingPending,
    /// Se emitió una única notificación resumiendo `n` pendientes.
    Reminded(usize),
}

/// Parámetros del timer armado, para introspección y tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSchedule {
    pub first_wake_delay: Duration,
    pub period: Duration,
}

struct ActiveTimer {
    generation: Uuid,
    handle: JoinHandle<()>,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    settings: SettingsRepository,
    flows: FlowRepository,
    notifier: Arc<dyn Notifier>,
    active: Arc<Mutex<Option<ActiveTimer>>>,
}

impl ReminderScheduler {
    pub fn new(settings: SettingsRepository, flows: FlowRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self { settings,
               flows,
               notifier,
               active: Arc::new(Mutex::new(None)) }
    }

    /// Cancela el timer previo (si lo hay) y programa uno nuevo según las
    /// preferencias actuales. Idempotente: llamar tras cada cambio de
    /// preferencias y en el arranque garantiza un único timer vivo.
    /// Devuelve `None` cuando los recordatorios quedan deshabilitados.
    pub async fn rearm(&self) -> Result<Option<ReminderSchedule>, StoreError> {
        let prefs = self.settings.prefs().await?;
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            prev.handle.abort();
            eprintln!("[scheduler] timer {} cancelado", prev.generation);
        }
        if !prefs.reminders_enabled {
            eprintln!("[scheduler] recordatorios deshabilitados; sin timer");
            return Ok(None);
        }

        let schedule = ReminderSchedule { first_wake_delay: FIRST_WAKE_DELAY,
                                          period: Duration::from_secs_f64(effective_period_minutes(&prefs) * 60.0) };
        let generation = Uuid::new_v4();
        let runner = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(schedule.first_wake_delay).await;
            loop {
                if let Err(e) = runner.run_wake_check(chrono::Local::now().hour()).await {
                    eprintln!("[scheduler] fallo en chequeo de recordatorios: {e}");
                }
                tokio::time::sleep(schedule.period).await;
            }
        });
        eprintln!("[scheduler] timer {} armado cada {:.0} min",
                  generation,
                  effective_period_minutes(&prefs));
        *active = Some(ActiveTimer { generation, handle });
        Ok(Some(schedule))
    }

    /// Desarma el timer activo (apagado del proceso).
    pub async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            prev.handle.abort();
        }
    }

    /// Lógica de un despertar. `hour` se inyecta (0–23, hora local) para
    /// que la decisión sea testeable sin reloj real.
    pub async fn run_wake_check(&self, hour: u32) -> Result<WakeOutcome, StoreError> {
        let prefs = self.settings.prefs().await?;
        if !prefs.reminders_enabled {
            return Ok(WakeOutcome::Disabled);
        }
        if prefs.quiet_hours.enabled && within_quiet_window(hour, &prefs.quiet_hours) {
            return Ok(WakeOutcome::Quiet);
        }

        let recent = self.flows.get_recent(RECENT_SCAN_LIMIT).await?;
        let pending = pending_reminder_count(&recent);
        if pending == 0 {
            return Ok(WakeOutcome::NothingPending);
        }
        self.notifier
            .notify("Recordatorio de firmas", &format!("{pending} flujo(s) pendientes."))
            .await;
        Ok(WakeOutcome::Reminded(pending))
    }
}
