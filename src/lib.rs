//! Approvals Hub
//!
//! Este crate implementa el motor de flujos de aprobación:
//! - `storage`: Record Store genérico por namespaces (memoria o archivos).
//! - `repository`: CRUD/merge de flujos y ajustes sobre el store.
//! - `workflow`: máquina de estados pura y programador de recordatorios.
//! - `protocol` + `hub`: protocolo de comandos del colaborador de UI y su
//!   despachador.
//!
//! Puede usarse desde `main.rs` o embebido por otros clientes.

pub mod config;
pub mod data;
pub mod errors;
pub mod hub;
pub mod notify;
pub mod protocol;
pub mod repository;
pub mod storage;
pub mod workflow;

pub use data::{Flow, FlowStatus, Preferences, Template};
pub use hub::ApprovalsHub;
pub use notify::{ConsoleNotifier, Notifier};
pub use protocol::{Command, Response};
pub use storage::{InMemoryRecordStore, JsonFileRecordStore, RecordStore};
