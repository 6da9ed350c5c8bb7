use serde_json::Value;

/// Masks credential-bearing fields in JSON payloads before they reach the
/// request log.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "secret" | "token" | "api_key" | "authorization"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.len() > 8 => {
            let visible = &s[..4];
            let end = &s[s.len() - 4..];
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_masks_token_fields() {
        let input = json!({
            "token": "abcdefghijklmnop",
            "amount": 100.0
        });

        let sanitized = sanitize_json(&input);
        let token = sanitized["token"].as_str().unwrap();

        assert!(token.contains("****"));
        assert_eq!(sanitized["amount"], 100.0);
    }

    #[test]
    fn test_masks_nested_fields() {
        let input = json!({
            "outer": { "authorization": "Bearer something-long" }
        });

        let sanitized = sanitize_json(&input);
        assert!(sanitized["outer"]["authorization"]
            .as_str()
            .unwrap()
            .contains("****"));
    }

    #[test]
    fn test_short_values_fully_masked() {
        let input = json!({ "secret": "abc" });

        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["secret"], "****");
    }

    #[test]
    fn test_plain_fields_untouched() {
        let input = json!({ "name": "Groceries", "color": "#00ff00" });

        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized, input);
    }
}
