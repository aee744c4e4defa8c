//! Preferencias globales del usuario (registro único).
//! Se reemplazan completas en cada guardado, nunca campo a campo.
use serde::{Deserialize, Serialize};

/// Ventana de horas silenciosas. Puede envolver la medianoche
/// (ej. 22 → 7): en ese caso la ventana es `hour >= from || hour < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    /// Hora de inicio, 0–23.
    pub from: u8,
    /// Hora de fin (exclusiva), 0–23.
    pub to: u8,
}

impl QuietHours {
    /// Primera hora fuera del rango 0–23, si la hay. El guardado de
    /// preferencias rechaza la ventana en ese caso, en la frontera, antes
    /// de que la aritmética de supresión la vea.
    pub fn hour_out_of_range(&self) -> Option<u8> {
        [self.from, self.to].into_iter().find(|h| *h > 23)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub reminders_enabled: bool,
    /// Cadencia configurada en horas. Valores menores a 0.25 h se clampean
    /// a 15 minutos efectivos, no se rechazan.
    pub reminder_every_hours: f64,
    pub quiet_hours: QuietHours,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { reminders_enabled: true,
               reminder_every_hours: 24.0,
               quiet_hours: QuietHours { enabled: false, from: 22, to: 7 } }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefs() {
        let prefs = Preferences::default();
        assert!(prefs.reminders_enabled);
        assert_eq!(prefs.reminder_every_hours, 24.0);
        assert!(!prefs.quiet_hours.enabled);
        assert_eq!((prefs.quiet_hours.from, prefs.quiet_hours.to), (22, 7));
    }

    #[test]
    fn test_quiet_hours_range_check() {
        let ok = QuietHours { enabled: true, from: 22, to: 7 };
        assert_eq!(ok.hour_out_of_range(), None);
        let bad_from = QuietHours { enabled: true, from: 99, to: 7 };
        assert_eq!(bad_from.hour_out_of_range(), Some(99));
        let bad_to = QuietHours { enabled: false, from: 0, to: 24 };
        assert_eq!(bad_to.hour_out_of_range(), Some(24));
    }

    #[test]
    fn test_prefs_wire_roundtrip() {
        let json = serde_json::json!({
            "remindersEnabled": false,
            "reminderEveryHours": 0.5,
            "quietHours": { "enabled": true, "from": 9, "to": 17 }
        });
        let prefs: Preferences = serde_json::from_value(json.clone()).expect("deserializa");
        assert!(!prefs.reminders_enabled);
        assert_eq!(prefs.reminder_every_hours, 0.5);
        assert_eq!(serde_json::to_value(&prefs).unwrap(), json);
    }
}
