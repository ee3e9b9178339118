//! Raw key→value parameter store.
//!
//! `Parameters` is the untyped layer underneath `tm_sim::ModelConfig`.  It
//! holds every value as a string and parses on lookup, so a missing or
//! malformed key is reported with the key name attached.
//!
//! # Formats
//!
//! Properties text (one `key = value` per line, `#` starts a comment):
//!
//! ```text
//! # timing
//! size.of.timestep = 1
//! stop.at = 3650
//! asm.15-25 = 0.00001
//! ```
//!
//! Flat JSON object; numbers and booleans are stored in their JSON text form:
//!
//! ```json
//! { "size.of.timestep": 1, "stop.at": 3650, "count.overlaps": false }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

#[derive(Clone, Debug, Default)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Parse properties text.  Later keys overwrite earlier ones.
    pub fn from_properties_str(text: &str) -> CoreResult<Self> {
        let mut params = Self::new();
        for (i, raw) in text.lines().enumerate() {
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(CoreError::Syntax { line: i + 1, text: raw.to_string() });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CoreError::Syntax { line: i + 1, text: raw.to_string() });
            }
            params.put(key, value.trim());
        }
        Ok(params)
    }

    /// Parse a flat JSON object.  Nested objects and arrays are rejected.
    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;
        let mut params = Self::new();
        for (key, value) in map {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CoreError::Parse {
                        key,
                        value:    other.to_string(),
                        expected: "a string, number or boolean",
                    });
                }
            };
            params.values.insert(key, text);
        }
        Ok(params)
    }

    /// Load a file, choosing JSON for a `.json` extension and properties
    /// text otherwise.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::from_json_str(&text)
        } else {
            Self::from_properties_str(&text)
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Insert or overwrite a value.
    pub fn put(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All keys starting with `prefix`, in lexicographic order.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .range(prefix.to_string()..)
            .map(|(k, _)| k.as_str())
            .take_while(move |k| k.starts_with(prefix))
    }

    pub fn get_string(&self, key: &str) -> CoreResult<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CoreError::MissingParameter(key.to_string()))
    }

    pub fn get_i64(&self, key: &str) -> CoreResult<i64> {
        self.parse(key, "an integer")
    }

    pub fn get_f32(&self, key: &str) -> CoreResult<f32> {
        self.parse(key, "a float")
    }

    pub fn get_f64(&self, key: &str) -> CoreResult<f64> {
        self.parse(key, "a double")
    }

    /// Accepts `true`/`false` in any case, and `1`/`0`.
    pub fn get_bool(&self, key: &str) -> CoreResult<bool> {
        let value = self.get_string(key)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(CoreError::Parse {
                key:      key.to_string(),
                value:    value.to_string(),
                expected: "a boolean",
            }),
        }
    }

    /// `get_f64`, or `default` when the key is absent.  A present but
    /// malformed value is still an error.
    pub fn get_f64_or(&self, key: &str, default: f64) -> CoreResult<f64> {
        if self.contains(key) { self.get_f64(key) } else { Ok(default) }
    }

    /// `get_bool`, or `default` when the key is absent.
    pub fn get_bool_or(&self, key: &str, default: bool) -> CoreResult<bool> {
        if self.contains(key) { self.get_bool(key) } else { Ok(default) }
    }

    fn parse<T: FromStr>(&self, key: &str, expected: &'static str) -> CoreResult<T> {
        let value = self.get_string(key)?;
        value.trim().parse::<T>().map_err(|_| CoreError::Parse {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        })
    }
}
