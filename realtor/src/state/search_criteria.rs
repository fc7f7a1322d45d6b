//! Structured property-search filter derived from free-text requests.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Property search filter. Every field is optional; `None` means "no constraint".
///
/// Serialized without `None` fields, so the JSON shown to the model and stored in checkpoints
/// only carries what is actually set. Numeric fields also accept numeric strings and, for the
/// counts, whole floats (`3.0`), since models emit both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "count")]
    pub min_bedroom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "count")]
    pub max_bedroom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "count")]
    pub min_bathroom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "count")]
    pub max_bathroom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "amount")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "amount")]
    pub max_price: Option<f64>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Set fields as `(field_name, display_value)`, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        fn push<T: ToString>(out: &mut Vec<(&'static str, String)>, name: &'static str, v: &Option<T>) {
            if let Some(v) = v {
                out.push((name, v.to_string()));
            }
        }
        let mut out = Vec::new();
        push(&mut out, "city", &self.city);
        push(&mut out, "state", &self.state);
        push(&mut out, "min_bedroom", &self.min_bedroom);
        push(&mut out, "max_bedroom", &self.max_bedroom);
        push(&mut out, "min_bathroom", &self.min_bathroom);
        push(&mut out, "max_bathroom", &self.max_bathroom);
        push(&mut out, "min_price", &self.min_price);
        push(&mut out, "max_price", &self.max_price);
        out
    }

    /// Pretty JSON of the set fields (`{}` when empty).
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Human-readable field name: underscores become spaces, first letter upper-cased
/// (`min_bedroom` -> `Min bedroom`).
pub fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Accepts `null`, a JSON number, or a string holding a decimal number.
struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(LenientNumber)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| E::custom(format!("not a number: {:?}", v)))
    }
}

fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    d.deserialize_any(LenientNumber)
}

fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    match amount(d)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) => Ok(Some(n as u32)),
        Some(n) => Err(de::Error::custom(format!(
            "expected a whole non-negative count, got {}",
            n
        ))),
    }
}
