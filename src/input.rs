//! Trip data input loading.
//!
//! This module reads trip data JSON from a file or stdin, enforces the
//! "top-level value is an array" contract before typed deserialization,
//! and carries the built-in sample dataset.

use crate::models::TripRecord;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Built-in sample dataset, also used by the test suite.
const SAMPLE_TRIPS: &str = include_str!("../fixtures/sample_trips.json");

/// Errors surfaced by the input layer.
///
/// The statistics core is total over its typed domain; everything that can
/// go wrong with user-supplied input is reported here instead.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input text was blank.
    #[error("input is empty; provide a JSON array of trip records")]
    Empty,

    /// The input source could not be read.
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input text was not valid JSON, or did not match the trip
    /// record shape.
    #[error("invalid trip data JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value was not an array.
    #[error("trip data must be a JSON array of trip records, got {found}")]
    NotAnArray { found: &'static str },
}

/// Parse trip records from JSON text.
///
/// Verifies the top-level array contract first, then deserializes into
/// typed records. Blank input is reported as [`InputError::Empty`].
pub fn parse_trips(text: &str) -> Result<Vec<TripRecord>, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }

    let value: Value = serde_json::from_str(text)?;
    if !value.is_array() {
        return Err(InputError::NotAnArray {
            found: json_type_name(&value),
        });
    }

    Ok(serde_json::from_value(value)?)
}

/// Load trip records from a file, or from stdin when the path is `-`.
pub fn load_trips(path: &Path) -> Result<Vec<TripRecord>, InputError> {
    let text = if path == Path::new("-") {
        debug!("Reading trip data from stdin");
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| InputError::Io {
                path: "stdin".to_string(),
                source,
            })?;
        buffer
    } else {
        debug!("Reading trip data from {}", path.display());
        std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.display().to_string(),
            source,
        })?
    };

    parse_trips(&text)
}

/// The built-in sample dataset.
pub fn sample_trips() -> Result<Vec<TripRecord>, InputError> {
    parse_trips(SAMPLE_TRIPS)
}

/// JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
