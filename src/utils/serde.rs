use itertools::Itertools;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn maybe_vec_deserialize<'de, D: Deserializer<'de>, T: Deserialize<'de>>(
    data: D,
) -> Result<Vec<T>, D::Error> {
    let maybe: Option<Vec<T>> = Deserialize::deserialize(data)?;
    Ok(maybe.unwrap_or_default())
}

/// Textual form of a JSON value as a dynamic client would print it.
///
/// Strings are taken verbatim (no quotes), arrays are comma-joined, scalars
/// use their JSON spelling (`null`, `true`, `12`).
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_to_text).join(","),
        other => other.to_string(),
    }
}

pub fn lenient_string_deserialize<'de, D: Deserializer<'de>>(
    data: D,
) -> Result<String, D::Error> {
    let value = Value::deserialize(data)?;
    Ok(value_to_text(&value))
}

pub fn lenient_vec_deserialize<'de, D: Deserializer<'de>>(
    data: D,
) -> Result<Vec<String>, D::Error> {
    let values: Vec<Value> = maybe_vec_deserialize(data)?;
    Ok(values.iter().map(value_to_text).collect())
}
