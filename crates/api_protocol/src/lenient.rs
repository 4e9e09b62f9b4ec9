//! Deserializers for values that HTML forms send as strings.
//!
//! Unusable values deserialize to `None` so the caller can report the field
//! as missing.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::SubmittedNumber;

/// Accepts a JSON number or a numeric string.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_number))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Like [`number`], but keeps a sent-but-unusable value apart from an
/// absent one. `null` counts as absent.
pub(crate) fn submitted_number<'de, D>(deserializer: D) -> Result<Option<SubmittedNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            as_number(&value).map_or(SubmittedNumber::Unusable, SubmittedNumber::Number),
        ),
    })
}

/// Accepts a JSON boolean or the strings `"true"`/`"false"`.
pub(crate) fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" => Some(true),
            "false" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Accepts comma separated text or an array of strings. Each array element
/// is one tag, commas included.
pub(crate) fn facilities<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(entities::parse_facilities(&s)),
        Some(Value::Array(items)) => {
            let mut tags: Vec<String> = Vec::new();
            for tag in items.iter().filter_map(Value::as_str).map(str::trim) {
                if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_string());
                }
            }
            Some(tags)
        }
        _ => None,
    })
}
