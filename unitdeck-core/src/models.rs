use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// One service as the API reports it. `enabled` arrives in legacy shapes
/// (boolean, or the strings `"enabled"`/`"disabled"`/`"static"`/...), and
/// `details` is an opaque string that may or may not hold JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub enabled: EnabledRepr,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
}

/// Raw wire representation of the enabled flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnabledRepr {
    Flag(bool),
    Text(String),
}

impl Default for EnabledRepr {
    fn default() -> Self {
        EnabledRepr::Text(String::new())
    }
}

/// Enabled flag normalized once at the registry boundary. The raw
/// representation is kept only as a sort tiebreak.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Enablement {
    pub on: bool,
    pub raw: String,
}

impl From<EnabledRepr> for Enablement {
    fn from(repr: EnabledRepr) -> Self {
        match repr {
            EnabledRepr::Flag(flag) => Enablement {
                on: flag,
                raw: flag.to_string(),
            },
            EnabledRepr::Text(text) => Enablement {
                on: text.to_lowercase() == "enabled",
                raw: text,
            },
        }
    }
}

/// The opaque `details` payload after one parse attempt. Display code
/// pattern-matches on the variant instead of re-parsing.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UnitDetails {
    Empty,
    Parsed(serde_json::Value),
    Unparsed { raw: String, error: String },
}

impl UnitDetails {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return UnitDetails::Empty;
        }
        match serde_json::from_str(raw) {
            Ok(value) => UnitDetails::Parsed(value),
            Err(err) => UnitDetails::Unparsed {
                raw: raw.to_string(),
                error: err.to_string(),
            },
        }
    }
}

/// Normalized view of one remote-managed service. Fields are derived, never
/// mutated in place; any change requires a round trip to the API.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceUnit {
    pub name: String,
    pub status: String,
    pub enabled: Enablement,
    pub description: String,
    pub details: UnitDetails,
}

impl ServiceUnit {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

impl From<ServiceRecord> for ServiceUnit {
    fn from(record: ServiceRecord) -> Self {
        ServiceUnit {
            name: record.name,
            status: record.status,
            enabled: record.enabled.into(),
            description: record.description,
            details: UnitDetails::parse(&record.details),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlRequest {
    pub name: String,
    pub action: String,
}

/// Payload for `/services/create`; `command` carries the full unit text.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequest {
    pub name: String,
    pub command: String,
    pub description: String,
}

/// Success body from the control/delete endpoints. Purely informational;
/// the registry refresh is the authority on resulting state.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub service_status: Option<String>,
    #[serde(default)]
    pub service_enabled: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enablement_normalizes_legacy_shapes() {
        let on: Enablement = EnabledRepr::Flag(true).into();
        assert!(on.on);
        assert_eq!(on.raw, "true");

        let off: Enablement = EnabledRepr::Flag(false).into();
        assert!(!off.on);

        let text: Enablement = EnabledRepr::Text("enabled".into()).into();
        assert!(text.on);

        let mixed: Enablement = EnabledRepr::Text("Enabled".into()).into();
        assert!(mixed.on);
        assert_eq!(mixed.raw, "Enabled");

        for raw in ["disabled", "static", "unknown", ""] {
            let e: Enablement = EnabledRepr::Text(raw.into()).into();
            assert!(!e.on, "{raw:?} must normalize to disabled");
        }
    }

    #[test]
    fn record_accepts_both_enabled_shapes() {
        let boolean: ServiceRecord =
            serde_json::from_value(serde_json::json!({"name": "a", "enabled": true})).unwrap();
        assert!(matches!(boolean.enabled, EnabledRepr::Flag(true)));

        let legacy: ServiceRecord =
            serde_json::from_value(serde_json::json!({"name": "b", "enabled": "disabled"}))
                .unwrap();
        assert!(matches!(legacy.enabled, EnabledRepr::Text(ref t) if t == "disabled"));
    }

    #[test]
    fn details_parse_variants() {
        assert!(matches!(UnitDetails::parse(""), UnitDetails::Empty));
        assert!(matches!(UnitDetails::parse("  "), UnitDetails::Empty));
        assert!(matches!(
            UnitDetails::parse(r#"{"unit":"a.service"}"#),
            UnitDetails::Parsed(_)
        ));
        match UnitDetails::parse("{not json") {
            UnitDetails::Unparsed { raw, error } => {
                assert_eq!(raw, "{not json");
                assert!(!error.is_empty());
            }
            other => panic!("expected Unparsed, got {other:?}"),
        }
    }

    #[test]
    fn active_is_the_only_running_status() {
        let record = ServiceRecord {
            name: "a".into(),
            status: "active".into(),
            enabled: EnabledRepr::default(),
            description: String::new(),
            details: String::new(),
        };
        let unit = ServiceUnit::from(record);
        assert!(unit.is_active());

        for status in ["inactive", "failed", "activating", "unknown"] {
            let unit = ServiceUnit {
                status: status.into(),
                ..unit.clone()
            };
            assert!(!unit.is_active());
        }
    }
}
