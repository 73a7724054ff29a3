// Lenient numeric values at the data boundary.
//
// Leaderboard exports mix numbers, percent strings ("24.1%"), thousands
// separators and a zoo of missing-value markers. Everything that is not a
// finite number collapses to "absent" here so the engine only ever sees
// numbers or `None`.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Spellings that mean "no value" in the exports we ingest.
const MISSING_MARKERS: &[&str] = &["", "-", "NA", "N/A", "NULL", "NONE"];

/// An optional statistic. Never holds NaN or an infinity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stat(Option<f64>);

impl Stat {
    pub const MISSING: Stat = Stat(None);

    /// Wrap a raw number, discarding non-finite values.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Stat(Some(value))
        } else {
            Stat(None)
        }
    }

    pub fn get(self) -> Option<f64> {
        self.0
    }

    pub fn is_present(self) -> bool {
        self.0.is_some()
    }

    /// The value, only if strictly positive.
    pub fn positive(self) -> Option<f64> {
        self.0.filter(|v| *v > 0.0)
    }
}

impl From<f64> for Stat {
    fn from(value: f64) -> Self {
        Stat::new(value)
    }
}

impl From<Option<f64>> for Stat {
    fn from(value: Option<f64>) -> Self {
        value.map(Stat::new).unwrap_or_default()
    }
}

/// Parse a raw text cell into a number.
///
/// Strips `%` and `,`, and returns `None` for missing markers, unparsable
/// text and non-finite results.
pub fn parse_stat(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != '%' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_some(&v),
            None => serializer.serialize_none(),
        }
    }
}

struct StatVisitor;

impl<'de> Visitor<'de> for StatVisitor {
    type Value = Stat;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string, or a missing-value marker")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Stat, E> {
        Ok(Stat::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Stat, E> {
        Ok(Stat::new(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Stat, E> {
        Ok(Stat::new(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Stat, E> {
        Ok(Stat(parse_stat(v)))
    }

    // Malformed cells become absent rather than failing the whole record.
    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Stat, E> {
        Ok(Stat::MISSING)
    }

    fn visit_none<E: de::Error>(self) -> Result<Stat, E> {
        Ok(Stat::MISSING)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Stat, E> {
        Ok(Stat::MISSING)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Stat, D::Error> {
        deserializer.deserialize_any(StatVisitor)
    }
}

impl<'de> Deserialize<'de> for Stat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatVisitor)
    }
}
