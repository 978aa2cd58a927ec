//! Cache key canonicalization.
//!
//! A key is the JSON serialization of `{"r": breakpoints, "s": descriptor,
//! "suffix": suffix}` with object keys sorted at every level, so descriptors
//! that differ only in insertion order share a key.

use serde_json::{Map, Number, Value};

use crate::error::RenderError;
use crate::value::{Scalar, StyleDescriptor, StyleValue};

/// Computes the cache key for one render call.
///
/// # Errors
///
/// Returns [`RenderError::Serialization`] if the descriptor holds a value JSON
/// cannot represent (NaN or infinite numbers).
pub fn cache_key(
    descriptor: &StyleDescriptor,
    breakpoints: &[u32],
    suffix: Option<&str>,
) -> Result<String, RenderError> {
    let mut root = Map::new();
    root.insert(
        "r".to_string(),
        Value::Array(breakpoints.iter().map(|&bp| Value::from(bp)).collect()),
    );
    root.insert("s".to_string(), descriptor_value(descriptor, "")?);
    root.insert(
        "suffix".to_string(),
        suffix.map_or(Value::Null, |s| Value::String(s.to_string())),
    );

    serde_json::to_string(&sorted(Value::Object(root)))
        .map_err(|e| RenderError::Serialization(e.to_string()))
}

fn descriptor_value(descriptor: &StyleDescriptor, path: &str) -> Result<Value, RenderError> {
    let mut map = Map::new();
    for (name, value) in descriptor.iter() {
        let path = if path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", path, name)
        };
        let value = match value {
            StyleValue::Scalar(scalar) => scalar_value(scalar, &path)?,
            StyleValue::Responsive(values) => Value::Array(
                values
                    .iter()
                    .map(|scalar| scalar_value(scalar, &path))
                    .collect::<Result<_, _>>()?,
            ),
            StyleValue::Nested(nested) => descriptor_value(nested, &path)?,
        };
        map.insert(name.to_string(), value);
    }
    Ok(Value::Object(map))
}

fn scalar_value(scalar: &Scalar, path: &str) -> Result<Value, RenderError> {
    Ok(match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Number(n) => Value::Number(Number::from_f64(*n).ok_or_else(|| {
            RenderError::Serialization(format!("non-finite number {} in '{}'", n, path))
        })?),
        Scalar::String(s) => Value::String(s.clone()),
    })
}

// serde_json::Map follows insertion order when the `preserve_order` feature
// is enabled anywhere in the dependency graph, so sort explicitly.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_is_deterministic() {
        let d = StyleDescriptor::new().set("color", "red").set("gap", vec![1, 2]);
        assert_eq!(
            cache_key(&d, &[960, 0], None).unwrap(),
            cache_key(&d, &[960, 0], None).unwrap()
        );
    }

    #[test]
    fn test_key_shape() {
        let d = StyleDescriptor::new().set("color", "red");
        assert_eq!(
            cache_key(&d, &[640], Some(":hover")).unwrap(),
            r#"{"r":[640],"s":{"color":"red"},"suffix":":hover"}"#
        );
    }

    #[test]
    fn test_key_ignores_insertion_order_at_every_level() {
        let a = StyleDescriptor::new()
            .set("color", "red")
            .set("fill", "#dark")
            .set(
                "&:hover",
                StyleDescriptor::new().set("color", "blue").set("hide", true),
            );
        let b = StyleDescriptor::new()
            .set(
                "&:hover",
                StyleDescriptor::new().set("hide", true).set("color", "blue"),
            )
            .set("fill", "#dark")
            .set("color", "red");
        assert_eq!(
            cache_key(&a, &[], None).unwrap(),
            cache_key(&b, &[], None).unwrap()
        );
    }

    #[test]
    fn test_key_distinguishes_breakpoints_and_suffix() {
        let d = StyleDescriptor::new().set("color", "red");
        let base = cache_key(&d, &[], None).unwrap();
        assert_ne!(base, cache_key(&d, &[640], None).unwrap());
        assert_ne!(base, cache_key(&d, &[], Some("")).unwrap());
        assert_ne!(base, cache_key(&d, &[], Some(":hover")).unwrap());
    }

    #[test]
    fn test_key_rejects_non_finite_numbers() {
        let d = StyleDescriptor::new().set(
            "&:hover",
            StyleDescriptor::new().set("opacity", vec![1.0, f64::NAN]),
        );
        let err = cache_key(&d, &[], None).unwrap_err();
        match err {
            RenderError::Serialization(msg) => assert!(msg.contains("&:hover.opacity")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_key_independent_of_insertion_order(
            entries in proptest::collection::btree_map("[a-z]{1,8}", "[a-z0-9#]{0,6}", 1..12)
        ) {
            let forward: StyleDescriptor = entries.iter().map(|(k, v)| (k.clone(), v.as_str())).collect();
            let reverse: StyleDescriptor = entries.iter().rev().map(|(k, v)| (k.clone(), v.as_str())).collect();
            prop_assert_eq!(
                cache_key(&forward, &[1200, 640], None).unwrap(),
                cache_key(&reverse, &[1200, 640], None).unwrap()
            );
        }
    }
}
