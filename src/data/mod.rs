//! Modelo de datos del hub: plantillas, flujos y preferencias.

pub mod flow;
pub mod prefs;
pub mod template;

pub use flow::{Flow, FlowPatch, FlowStatus, Stage};
pub use prefs::{Preferences, QuietHours};
pub use template::{Template, TemplateStage};

/// Marca de tiempo actual en milisegundos desde epoch (reloj de pared).
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
