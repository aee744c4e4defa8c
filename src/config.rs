//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`). El directorio de datos aloja los archivos JSON del Record
//! Store que usa el binario.
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

/// Configuración global de la aplicación.
pub struct AppConfig {
    /// Configuración específica de persistencia.
    pub storage: StorageConfig,
}

/// Parámetros del Record Store en archivos.
pub struct StorageConfig {
    /// Directorio donde vive un archivo JSON por namespace.
    pub data_dir: PathBuf,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let data_dir = env::var("APPROVALS_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    AppConfig { storage: StorageConfig { data_dir: PathBuf::from(data_dir) } }
});
