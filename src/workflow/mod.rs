//! Lógica de workflow: máquina de estados de flujos y programador de
//! recordatorios.

pub mod scheduler;
pub mod state;

pub use scheduler::{ReminderSchedule, ReminderScheduler, WakeOutcome};
pub use state::{mark_stage_done, materialize_flow, MarkOutcome};
