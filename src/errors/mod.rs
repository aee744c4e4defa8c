//! Taxonomía de errores del hub: fallos de persistencia (`StoreError`) y
//! fallos de dominio / entrada inválida (`FlowError`).

pub mod flow_error;
pub mod store_error;

pub use flow_error::FlowError;
pub use store_error::StoreError;
