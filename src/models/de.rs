//! Lenient deserializers for fields the backend sends as either numbers or strings.

use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

/// Money amount sent as `1500`, `1500.5` or `"1500"`.
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("amount out of range")),
        NumberOrString::Text(s) => parse_amount(&s)
            .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&s), &"a numeric amount")),
    }
}

/// Parse a textual amount. `NaN` and the infinities are not amounts.
fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Optional money amount; `null`, missing and `""` all map to `None`.
pub fn opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| de::Error::custom("amount out of range")),
        Some(NumberOrString::Text(s)) => parse_amount(&s)
            .map(Some)
            .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&s), &"a numeric amount")),
    }
}

/// Record identifier sent as a string or an integer.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::Text(s) => Ok(s),
    }
}

/// Optional record identifier; `null` and `""` map to `None`.
pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrString::Number(n)) => Some(n.to_string()),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => None,
        Some(NumberOrString::Text(s)) => Some(s),
    })
}
