use serde_json::Value;

use crate::change::{Change, FieldError};

/// Reports every change whose `new` value would leave the field as it is.
pub fn redundant_change_errors(changes: &[Change]) -> Vec<FieldError> {
    changes
        .iter()
        .enumerate()
        .filter(|(_, change)| is_redundant(&change.old, &change.new))
        .map(|(i, change)| {
            FieldError::new(
                format!("/changes/{i}"),
                format!("redundant change for {}", change.key),
            )
        })
        .collect()
}

fn is_redundant(old: &Value, new: &Value) -> bool {
    if is_null_or_empty(old) && is_null_or_empty(new) {
        return true;
    }

    same_value(old, new)
}

fn is_null_or_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// numbers compare by value, so 1 and 1.0 are the same
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_unchanged_values_by_position() {
        let changes = [
            Change::new("/a", json!("x"), json!("y")),
            Change::new("/b", json!("x"), json!("x")),
            Change::new("/c", json!(null), json!("")),
        ];

        assert_eq!(
            redundant_change_errors(&changes),
            [
                FieldError::new("/changes/1", "redundant change for /b"),
                FieldError::new("/changes/2", "redundant change for /c"),
            ]
        );
    }

    #[test]
    fn numbers_compare_numerically() {
        assert!(is_redundant(&json!(1), &json!(1.0)));
        assert!(is_redundant(&json!({"n": [2]}), &json!({"n": [2.0]})));
        assert!(!is_redundant(&json!(1), &json!("1")));
        assert!(!is_redundant(&json!(false), &json!(true)));
    }
}
