//! Float encoding that survives non-finite values.
//!
//! JSON has no NaN or infinity, so finite numbers are written as numbers
//! and the rest as the strings `"NaN"`, `"inf"` and `"-inf"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum JsonFloat {
    Number(f64),
    Text(String),
}

impl From<f64> for JsonFloat {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            JsonFloat::Text("NaN".to_string())
        } else if v == f64::INFINITY {
            JsonFloat::Text("inf".to_string())
        } else if v == f64::NEG_INFINITY {
            JsonFloat::Text("-inf".to_string())
        } else {
            JsonFloat::Number(v)
        }
    }
}

impl JsonFloat {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            JsonFloat::Number(v) => Ok(v),
            JsonFloat::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid float '{}'", other))),
            },
        }
    }
}

/// `#[serde(with)]` module for `Vec<f64>` fields.
pub mod point {
    use super::*;

    pub fn serialize<S: Serializer>(point: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(point.iter().map(|&v| JsonFloat::from(v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<JsonFloat>::deserialize(deserializer)?
            .into_iter()
            .map(JsonFloat::into_f64)
            .collect()
    }
}

/// `#[serde(with)]` module for `Option<f64>` fields.
pub mod value {
    use super::*;

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(JsonFloat::from).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Option::<JsonFloat>::deserialize(deserializer)?
            .map(JsonFloat::into_f64)
            .transpose()
    }
}

/// Encodes a point as a JSON array.
pub fn point_to_json(point: &[f64]) -> serde_json::Result<String> {
    let encoded: Vec<JsonFloat> = point.iter().map(|&v| JsonFloat::from(v)).collect();
    serde_json::to_string(&encoded)
}

/// Decodes a point written by [`point_to_json`].
pub fn point_from_json(text: &str) -> serde_json::Result<Vec<f64>> {
    serde_json::from_str::<Vec<JsonFloat>>(text)?
        .into_iter()
        .map(JsonFloat::into_f64)
        .collect()
}
