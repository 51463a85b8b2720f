use serde_json::Value;

use super::scalar_text;

/// Result fields printed by `--output minimal`, in priority order.
const HEADLINE_KEYS: [&str; 7] = [
    "irr",
    "present_value",
    "clean_price",
    "growth_factor",
    "rate",
    "years",
    "present_values",
];

/// Print just the headline figure of a result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", headline(result_obj));
}

fn headline(result: &Value) -> String {
    if let Value::Object(map) = result {
        for key in HEADLINE_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return scalar_text(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar_text(val));
        }
    }
    scalar_text(result)
}
