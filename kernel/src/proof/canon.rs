//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! All digests over planner artifacts route through [`canonical_json_bytes`].
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted lexicographically (byte order).
//! 2. Compact form, no whitespace (`{"a":1,"b":2}`).
//! 3. Numbers must be integers (`i64` or `u64`). Floats are rejected; cost
//!    values enter artifacts as `f64::to_bits` so formatting cannot drift
//!    across platforms.
//! 4. Output is always valid UTF-8.
//!
//! `serde_json::Map` is `BTreeMap`-backed (the `preserve_order` feature is not
//! enabled anywhere in the workspace), so rule 1 falls out of the serializer.

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    /// A JSON number was not an integer.
    NonIntegerNumber { path: String, raw: String },
    /// The serializer itself failed.
    Serialize { detail: String },
}

impl std::fmt::Display for CanonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonIntegerNumber { path, raw } => {
                write!(f, "non-integer number at {path} in canonical JSON: {raw}")
            }
            Self::Serialize { detail } => write!(f, "canonical JSON serialization failed: {detail}"),
        }
    }
}

impl std::error::Error for CanonError {}

/// Produce canonical JSON bytes from a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] if any number is not representable
/// as `i64` or `u64`.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    ensure_integers(value, &mut String::from("$"))?;
    serde_json::to_vec(value).map_err(|e| CanonError::Serialize {
        detail: e.to_string(),
    })
}

fn ensure_integers(value: &serde_json::Value, path: &mut String) -> Result<(), CanonError> {
    match value {
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(())
            } else {
                Err(CanonError::NonIntegerNumber {
                    path: path.clone(),
                    raw: n.to_string(),
                })
            }
        }
        serde_json::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{i}]"));
                ensure_integers(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        serde_json::Value::Object(map) => {
            for (key, item) in map {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                ensure_integers(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        serde_json::Value::Null | serde_json::Value::Bool(_) | serde_json::Value::String(_) => {
            Ok(())
        }
    }
}
