//! Protocolo de comandos hacia el colaborador de UI.
//! Variantes etiquetadas (`type` + `payload`, tags en mayúsculas como en el
//! wire original) que se decodifican y validan en la frontera: una forma
//! inválida se rechaza al deserializar, antes de tocar lógica de negocio.
//!
//! La decodificación pasa por un sobre intermedio `{ type, payload }` con
//! `payload` opcional: los comandos sin argumentos (`PING`, `GET_PREFS`) y
//! `GET_RECENT` llegan del colaborador sin la clave `payload` y deben
//! aceptarse igual.
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{Flow, FlowStatus, Preferences};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    #[serde(rename = "PING")]
    Ping,
    #[serde(rename = "START_FLOW", rename_all = "camelCase")]
    StartFlow { row_key: String, template_id: String },
    /// `limit` opcional; el despacho aplica el default de 5.
    #[serde(rename = "GET_RECENT")]
    GetRecent { limit: Option<usize> },
    #[serde(rename = "GET_PREFS")]
    GetPrefs,
    /// Preferencias completas: el registro se reemplaza entero al guardar.
    #[serde(rename = "SET_PREFS")]
    SetPrefs(Preferences),
    #[serde(rename = "MARK_STAGE_DONE", rename_all = "camelCase")]
    MarkStageDone { row_key: String, stage_id: String },
    #[serde(rename = "SET_FLOW_STATUS", rename_all = "camelCase")]
    SetFlowStatus { row_key: String, status: FlowStatus },
}

/// Sobre del wire: el tag siempre viene; el payload puede faltar.
#[derive(Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

const KNOWN_COMMANDS: &[&str] = &["PING", "START_FLOW", "GET_RECENT", "GET_PREFS",
                                  "SET_PREFS", "MARK_STAGE_DONE", "SET_FLOW_STATUS"];

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de>
    {
        let wire = WireMessage::deserialize(deserializer)?;
        // payload ausente equivale a payload vacío (así emite el colaborador
        // los comandos sin argumentos)
        let payload = wire.payload.unwrap_or_else(|| serde_json::json!({}));
        match wire.kind.as_str() {
            "PING" => Ok(Command::Ping),
            "GET_PREFS" => Ok(Command::GetPrefs),
            "GET_RECENT" => {
                #[derive(Deserialize)]
                struct Args {
                    #[serde(default)]
                    limit: Option<usize>,
                }
                let args: Args = serde_json::from_value(payload).map_err(D::Error::custom)?;
                Ok(Command::GetRecent { limit: args.limit })
            }
            "START_FLOW" => {
                #[derive(Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct Args {
                    row_key: String,
                    template_id: String,
                }
                let args: Args = serde_json::from_value(payload).map_err(D::Error::custom)?;
                Ok(Command::StartFlow { row_key: args.row_key,
                                        template_id: args.template_id })
            }
            "SET_PREFS" => {
                let prefs: Preferences = serde_json::from_value(payload).map_err(D::Error::custom)?;
                Ok(Command::SetPrefs(prefs))
            }
            "MARK_STAGE_DONE" => {
                #[derive(Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct Args {
                    row_key: String,
                    stage_id: String,
                }
                let args: Args = serde_json::from_value(payload).map_err(D::Error::custom)?;
                Ok(Command::MarkStageDone { row_key: args.row_key,
                                            stage_id: args.stage_id })
            }
            "SET_FLOW_STATUS" => {
                #[derive(Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct Args {
                    row_key: String,
                    status: FlowStatus,
                }
                let args: Args = serde_json::from_value(payload).map_err(D::Error::custom)?;
                Ok(Command::SetFlowStatus { row_key: args.row_key,
                                            status: args.status })
            }
            other => Err(D::Error::unknown_variant(other, KNOWN_COMMANDS)),
        }
    }
}

/// Respuestas con las formas `{ ok, … }` del wire original. `untagged`
/// para que cada variante serialice plana, sin envoltorio adicional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Pong { ok: bool, ts: i64 },
    Flow { ok: bool, flow: Flow },
    Recent { ok: bool, items: Vec<Flow> },
    Prefs { ok: bool, prefs: Preferences },
    Error { ok: bool, error: String },
    Ack { ok: bool },
}

impl Response {
    pub fn ack() -> Self {
        Response::Ack { ok: true }
    }

    pub fn error(err: impl ToString) -> Self {
        Response::Error { ok: false,
                          error: err.to_string() }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            Response::Pong { ok, .. }
            | Response::Flow { ok, .. }
            | Response::Recent { ok, .. }
            | Response::Prefs { ok, .. }
            | Response::Error { ok, .. }
            | Response::Ack { ok } => *ok,
        }
    }
}
