//! Responsive zones.
//!
//! Breakpoints are pixel thresholds in descending order. Zone `i` covers
//! widths from `breakpoints[i]` up to one pixel below `breakpoints[i - 1]`;
//! the first zone is unbounded above and a threshold of `0` leaves a zone
//! unbounded below. `[1200, 640, 0]` describes three zones: desktop, tablet
//! and mobile.

use crate::value::{Scalar, StyleValue};

/// Spreads a style value over `zones` entries.
pub type ZoneNormalizer = fn(Option<&StyleValue>, usize) -> Option<Vec<Scalar>>;

/// Wraps per-zone CSS into media query blocks.
pub type MediaWrapper = fn(&[String], &[u32]) -> String;

/// Spreads `value` over exactly `zones` entries.
///
/// Scalars repeat in every zone. Sequences are truncated to `zones`; a missing
/// or null entry takes the value of the previous zone. Absent values and
/// nested blocks yield `None`.
///
/// ```rust
/// use tastycss::{responsive::normalize_style_zones, Scalar, StyleValue};
///
/// let value = StyleValue::from(vec!["2x", "1x"]);
/// let zones = normalize_style_zones(Some(&value), 3).unwrap();
/// assert_eq!(zones, [Scalar::from("2x"), Scalar::from("1x"), Scalar::from("1x")]);
/// ```
pub fn normalize_style_zones(value: Option<&StyleValue>, zones: usize) -> Option<Vec<Scalar>> {
    match value? {
        StyleValue::Scalar(scalar) => Some(vec![scalar.clone(); zones]),
        StyleValue::Responsive(values) => {
            let mut out = Vec::with_capacity(zones);
            let mut last = Scalar::Null;
            for i in 0..zones {
                if let Some(value) = values.get(i).filter(|v| !v.is_null()) {
                    last = value.clone();
                }
                out.push(last.clone());
            }
            Some(out)
        }
        StyleValue::Nested(_) => None,
    }
}

/// Wraps each non-empty zone's rules in a media query for that zone.
///
/// `breakpoints` must be strictly descending; other orders describe zones
/// with no width in them.
///
/// ```rust
/// use tastycss::responsive::media_wrapper;
///
/// let css = media_wrapper(&["gap: 2x;\n".into(), "gap: 1x;\n".into()], &[640, 0]);
/// assert_eq!(
///     css,
///     "@media (min-width: 640px) {\ngap: 2x;\n}\n@media (max-width: 639px) {\ngap: 1x;\n}\n"
/// );
/// ```
pub fn media_wrapper(rules: &[String], breakpoints: &[u32]) -> String {
    debug_assert!(
        breakpoints.windows(2).all(|pair| pair[0] > pair[1]),
        "breakpoints must be strictly descending, got {:?}",
        breakpoints
    );

    let mut out = String::new();
    for (i, (zone_rules, &min)) in rules.iter().zip(breakpoints).enumerate() {
        if zone_rules.is_empty() {
            continue;
        }

        let mut conditions = Vec::with_capacity(2);
        if min > 0 {
            conditions.push(format!("(min-width: {}px)", min));
        }
        if i > 0 {
            let max = breakpoints[i - 1].saturating_sub(1);
            conditions.push(format!("(max-width: {}px)", max));
        }

        if conditions.is_empty() {
            out.push_str(zone_rules);
        } else {
            out.push_str(&format!(
                "@media {} {{\n{}}}\n",
                conditions.join(" and "),
                zone_rules
            ));
        }
    }
    out
}
