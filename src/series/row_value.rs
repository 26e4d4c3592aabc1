use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Serialize, Deserialize};

/// One cell of a metric series.
///
/// JSON form is the bare value: a number, an array of numbers, or `null`.
/// Non-finite values are written as the strings `"NaN"`, `"Infinity"` and
/// `"-Infinity"` so a diverged loss survives a save/load cycle.
///
/// - `Scalar`  — the single value reported for this epoch
/// - `Multi`   — several producers (e.g. multiple loss heads) reported into
///               the same epoch slot
/// - `Missing` — the epoch passed without a report for this metric
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Scalar(f64),
    Multi(Vec<f64>),
    Missing,
}

impl RowValue {
    /// Folds another report for the same epoch into this cell.
    ///
    /// `Scalar(a)` becomes `Multi([a, v])`, `Multi` grows by one, and a
    /// `Missing` placeholder starts a list holding only `v`.
    pub fn merge(&mut self, value: f64) {
        match self {
            RowValue::Scalar(old) => *self = RowValue::Multi(vec![*old, value]),
            RowValue::Multi(values) => values.push(value),
            RowValue::Missing => *self = RowValue::Multi(vec![value]),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            RowValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RowValue::Missing)
    }
}

impl From<f64> for RowValue {
    fn from(v: f64) -> Self {
        RowValue::Scalar(v)
    }
}

// ---------------------------------------------------------------------------
// JSON codec
// ---------------------------------------------------------------------------

const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

/// A single metric value with the non-finite string encoding.
struct Num(f64);

impl Serialize for Num {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() {
            serializer.serialize_f64(v)
        } else if v.is_nan() {
            serializer.serialize_str(NAN)
        } else if v > 0.0 {
            serializer.serialize_str(INFINITY)
        } else {
            serializer.serialize_str(NEG_INFINITY)
        }
    }
}

fn parse_non_finite<E: de::Error>(s: &str) -> Result<f64, E> {
    match s {
        NAN          => Ok(f64::NAN),
        INFINITY     => Ok(f64::INFINITY),
        NEG_INFINITY => Ok(f64::NEG_INFINITY),
        other        => Err(E::invalid_value(de::Unexpected::Str(other), &"a number, \"NaN\" or \"Infinity\"")),
    }
}

struct NumVisitor;

impl<'de> Visitor<'de> for NumVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a non-finite marker string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> { Ok(v) }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> { Ok(v as f64) }
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> { Ok(v as f64) }
    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> { parse_non_finite(v) }
}

impl<'de> Deserialize<'de> for Num {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumVisitor).map(Num)
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValue::Scalar(v)     => Num(*v).serialize(serializer),
            RowValue::Multi(values) => serializer.collect_seq(values.iter().map(|v| Num(*v))),
            RowValue::Missing       => serializer.serialize_unit(),
        }
    }
}

struct RowValueVisitor;

impl<'de> Visitor<'de> for RowValueVisitor {
    type Value = RowValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a list of numbers or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RowValue, E> { Ok(RowValue::Scalar(v)) }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RowValue, E> { Ok(RowValue::Scalar(v as f64)) }
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RowValue, E> { Ok(RowValue::Scalar(v as f64)) }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RowValue, E> {
        parse_non_finite(v).map(RowValue::Scalar)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RowValue, E> { Ok(RowValue::Missing) }
    fn visit_none<E: de::Error>(self) -> Result<RowValue, E> { Ok(RowValue::Missing) }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RowValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RowValue, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(Num(v)) = seq.next_element()? {
            values.push(v);
        }
        Ok(RowValue::Multi(values))
    }
}

impl<'de> Deserialize<'de> for RowValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RowValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_promotes_scalar_then_appends() {
        let mut cell = RowValue::Scalar(0.5);
        cell.merge(0.4);
        assert_eq!(cell, RowValue::Multi(vec![0.5, 0.4]));
        cell.merge(0.3);
        assert_eq!(cell, RowValue::Multi(vec![0.5, 0.4, 0.3]));
    }

    #[test]
    fn merge_into_missing_starts_list() {
        let mut cell = RowValue::Missing;
        cell.merge(1.0);
        assert_eq!(cell, RowValue::Multi(vec![1.0]));
    }

    #[test]
    fn json_form_is_bare() {
        let row = vec![RowValue::Scalar(1.5), RowValue::Multi(vec![1.0, 2.0]), RowValue::Missing];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, "[1.5,[1.0,2.0],null]");

        let back: Vec<RowValue> = serde_json::from_str("[1, [2, 3.5], null]").unwrap();
        assert_eq!(back, vec![
            RowValue::Scalar(1.0),
            RowValue::Multi(vec![2.0, 3.5]),
            RowValue::Missing,
        ]);
    }

    #[test]
    fn non_finite_values_use_marker_strings() {
        let row = vec![
            RowValue::Scalar(f64::INFINITY),
            RowValue::Multi(vec![1.0, f64::NAN, f64::NEG_INFINITY]),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["Infinity",[1.0,"NaN","-Infinity"]]"#);

        let back: Vec<RowValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0], RowValue::Scalar(f64::INFINITY));
        match &back[1] {
            RowValue::Multi(v) => {
                assert_eq!(v[0], 1.0);
                assert!(v[1].is_nan());
                assert_eq!(v[2], f64::NEG_INFINITY);
            }
            other => panic!("expected multi, got {:?}", other),
        }
    }

    #[test]
    fn unknown_strings_are_rejected() {
        assert!(serde_json::from_str::<RowValue>(r#""inf""#).is_err());
    }
}
