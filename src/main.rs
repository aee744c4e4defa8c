//! Binario del hub de aprobaciones.
//! Arranca el Record Store en archivos, siembra defaults de primer
//! arranque, arma el timer de recordatorios y atiende el protocolo de
//! comandos como JSON por línea sobre stdin/stdout (el colaborador de UI
//! habla este mismo protocolo).
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use approvals_hub::config::CONFIG;
use approvals_hub::{ApprovalsHub, Command, ConsoleNotifier, JsonFileRecordStore, Response};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let store = Arc::new(JsonFileRecordStore::new(&CONFIG.storage.data_dir)?);
    let hub = ApprovalsHub::new(store, Arc::new(ConsoleNotifier));

    hub.provision_defaults().await?;
    hub.scheduler().rearm().await?;
    eprintln!("[hub] listo; comandos JSON por línea en stdin (EOF para salir)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Command>(&line) {
            Ok(cmd) => hub.dispatch(cmd).await,
            // forma inválida: rechazada en la frontera, nunca llega a los handlers
            Err(e) => Response::error(format!("Mensaje no manejado: {e}")),
        };
        println!("{}", serde_json::to_string(&response)?);
    }

    hub.scheduler().shutdown().await;
    Ok(())
}
