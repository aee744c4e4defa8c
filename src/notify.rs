//! Capacidad de notificación al usuario.
//! Efecto secundario best-effort: un fallo de entrega nunca hace fallar el
//! comando que lo disparó (la entrega real depende del SO anfitrión).
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Emite una notificación con título y mensaje. Sin resultado: el
    /// llamador no depende de que la entrega ocurra.
    async fn notify(&self, title: &str, message: &str);
}

/// Notificador de consola para el binario y demos.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, title: &str, message: &str) {
        println!("[notify] {title}: {message}");
    }
}

/// Notificador que registra lo emitido, para aserciones en tests.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("lock de notificaciones").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) {
        self.sent
            .lock()
            .expect("lock de notificaciones")
            .push((title.to_string(), message.to_string()));
    }
}
