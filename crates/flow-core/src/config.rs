//! Editor configuration supplied by the host.
//!
//! Deserializes from the camelCase option object a browser host passes in;
//! every field is optional.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Host-supplied editor options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowConfig {
    /// Label given to the start event when it has none.
    pub start_text: String,
    /// Label given to the end event when it has none.
    pub over_text: String,
    /// Canvas height in pixels. Accepts a number or a numeric string.
    #[serde(deserialize_with = "number_or_string")]
    pub height: f64,
    pub read_only: bool,
    pub zoom: ZoomConfig,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            start_text: "start".to_string(),
            over_text: "over".to_string(),
            height: 500.0,
            read_only: false,
            zoom: ZoomConfig::default(),
        }
    }
}

/// Wheel zoom bounds and rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    /// Scale multiplier for one wheel notch (100 delta units).
    pub step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 4.0,
            step: 1.1,
        }
    }
}

impl ZoomConfig {
    pub fn clamp(&self, scale: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        scale.clamp(lo, hi)
    }
}

struct NumberOrString;

impl Visitor<'_> for NumberOrString {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        v.trim()
            .parse::<f64>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// Deserialize an `f64` given either as a JSON number or a numeric string.
pub fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    deserializer.deserialize_any(NumberOrString)
}

/// Like [`number_or_string`], for optional fields.
pub fn opt_number_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    number_or_string(deserializer).map(Some)
}
