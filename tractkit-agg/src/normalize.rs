//! Value normalization for survey and health-table fields
//!
//! Raw values arrive as JSON (strings from the survey API, numbers from our own
//! zero-base markers). Two operations:
//! - [`clean`]: strip provider "no data" sentinels to null
//! - [`format_percent`]: render a percentage as `"<one decimal>%"`, clamped to 100

use serde_json::Value;
use tracing::warn;

/// Raw tokens the survey provider uses for "not available"
pub const SENTINELS: [&str; 3] = ["", "-666666666", "-888888888"];

const SENTINEL_NUMBERS: [i64; 2] = [-666_666_666, -888_888_888];

/// True when `raw` is a provider sentinel (or already null)
pub fn is_sentinel(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => SENTINELS.contains(&s.as_str()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .is_some_and(|i| SENTINEL_NUMBERS.contains(&i)),
        _ => false,
    }
}

/// Null for sentinels, otherwise the value unchanged (type preserved)
pub fn clean(raw: &Value) -> Value {
    if is_sentinel(raw) {
        Value::Null
    } else {
        raw.clone()
    }
}

/// Format a percentage-valued field
///
/// - null, empty or blank → null
/// - not numeric → returned unchanged
/// - above 100 → clamped to 100 (data-quality warning, not an error)
/// - otherwise `"{:.1}%"`
pub fn format_percent(raw: &Value) -> Value {
    let parsed = match raw {
        Value::Null => return Value::Null,
        Value::String(s) if s.trim().is_empty() => return Value::Null,
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    let Some(mut value) = parsed else {
        return raw.clone();
    };

    if value > 100.0 {
        warn!(value, "Unusually high percentage, capping to 100");
        value = 100.0;
    }

    Value::String(format!("{:.1}%", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_strips_every_sentinel() {
        for raw in [
            json!(null),
            json!(""),
            json!("-666666666"),
            json!("-888888888"),
            json!(-666666666),
            json!(-888888888),
        ] {
            assert_eq!(clean(&raw), Value::Null, "{raw} should clean to null");
        }
    }

    #[test]
    fn test_clean_passes_other_values_through() {
        for raw in [
            json!("0"),
            json!("1234"),
            json!("-1"),
            json!(" "),
            json!("-666666666.5"),
            json!(42),
            json!(0),
            json!("N/A"),
        ] {
            assert_eq!(clean(&raw), raw);
        }
    }

    #[test]
    fn test_format_percent_one_decimal() {
        assert_eq!(format_percent(&json!("32.14")), json!("32.1%"));
        assert_eq!(format_percent(&json!("7")), json!("7.0%"));
        assert_eq!(format_percent(&json!(" 55.55 ")), json!("55.5%"));
        assert_eq!(format_percent(&json!(12.26)), json!("12.3%"));
        assert_eq!(format_percent(&json!("100")), json!("100.0%"));
        assert_eq!(format_percent(&json!("0")), json!("0.0%"));
    }

    #[test]
    fn test_format_percent_clamps_above_100() {
        assert_eq!(format_percent(&json!("100.01")), json!("100.0%"));
        assert_eq!(format_percent(&json!("250")), json!("100.0%"));
        assert_eq!(format_percent(&json!(1e6)), json!("100.0%"));
    }

    #[test]
    fn test_format_percent_blank_and_non_numeric() {
        assert_eq!(format_percent(&json!(null)), Value::Null);
        assert_eq!(format_percent(&json!("")), Value::Null);
        assert_eq!(format_percent(&json!("   ")), Value::Null);
        assert_eq!(format_percent(&json!("N/A")), json!("N/A"));
        // Already formatted values are left alone
        assert_eq!(format_percent(&json!("45.2%")), json!("45.2%"));
    }
}
