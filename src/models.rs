use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One roster entry as the backend sends it.
///
/// The backend is free to send plain identifiers or records, so the shape is
/// resolved once here instead of being sniffed at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Participant {
    Identifier(String),
    Record(ParticipantRecord),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub schedule: String,
    #[serde(default, deserialize_with = "lenient_capacity")]
    pub max_participants: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub participants: Vec<Participant>,
}

impl ActivityDetails {
    /// Not clamped: an over-full activity reports a negative count.
    pub fn spots_left(&self) -> i64 {
        self.max_participants - self.participants.len() as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub name: String,
    pub details: ActivityDetails,
}

/// Activities keyed by name, in the order the backend listed them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Activities {
    pub items: Vec<Activity>,
}

impl Activities {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_str(body)?;
        let mut items = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let details = serde_json::from_value(value)?;
            items.push(Activity { name, details });
        }
        Ok(Self { items })
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.items.iter().find(|activity| activity.name == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.items.iter()
    }
}

/// Success body of the signup and unregister calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub activity: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveRequest {
    pub activity: Option<String>,
    pub email: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Participant>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Participant>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text fields take whatever scalar the backend sends. Zero, `false` and
/// `null` count as absent; other non-strings keep their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Fractions are truncated and numeric strings parsed. Anything else is a
/// capacity of zero rather than a failed list.
fn lenient_capacity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    };
    Ok(number.unwrap_or(0))
}
