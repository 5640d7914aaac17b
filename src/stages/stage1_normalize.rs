use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::info;

use crate::io::{read_yaml_file, require_file, write_json};
use crate::models::{default_resume_structure, Resume};

/// Dash variants rewritten to an ASCII hyphen in phone numbers
const UNICODE_DASHES: [char; 6] = [
    '\u{2010}', // hyphen
    '\u{2011}', // non-breaking hyphen
    '\u{2012}', // figure dash
    '\u{2013}', // en dash
    '\u{2014}', // em dash
    '\u{2015}', // horizontal bar
];

/// Deep-merge `data` over `defaults`.
///
/// - Mapping defaults: each default key recurses when present in `data` and
///   is copied from `defaults` when absent. Keys only in `data` are kept,
///   after the default keys. Non-mapping data is treated as an empty mapping.
/// - List defaults: replaced wholesale by `data` when it is a list, else empty.
/// - Scalar defaults: `data` unless it is null.
pub fn merge_defaults(data: &Value, defaults: &Value) -> Value {
    match defaults {
        Value::Object(default_map) => {
            let empty = Map::new();
            let data_map = data.as_object().unwrap_or(&empty);

            let mut merged = Map::with_capacity(default_map.len().max(data_map.len()));
            for (key, default_value) in default_map {
                let value = match data_map.get(key) {
                    Some(actual) => merge_defaults(actual, default_value),
                    None => default_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            for (key, value) in data_map {
                if !merged.contains_key(key) {
                    merged.insert(key.clone(), value.clone());
                }
            }
            Value::Object(merged)
        }
        Value::Array(_) => match data {
            Value::Array(items) => Value::Array(items.clone()),
            _ => Value::Array(Vec::new()),
        },
        _ => {
            if data.is_null() {
                defaults.clone()
            } else {
                data.clone()
            }
        }
    }
}

/// Replace the recognized Unicode dash variants with `-`
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .map(|c| if UNICODE_DASHES.contains(&c) { '-' } else { c })
        .collect()
}

/// Fill a raw resume document to the default structure and clean up the phone number
pub fn normalize(raw: &Value) -> Resume {
    let mut merged = merge_defaults(raw, &default_resume_structure());

    let phone = merged
        .pointer("/basics/phone")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(normalize_phone_number);
    if let (Some(phone), Some(slot)) = (phone, merged.pointer_mut("/basics/phone")) {
        *slot = Value::String(phone);
    }

    Resume::from_value(merged)
}

/// Execute Stage 1: convert the YAML resume into the normalized JSON document
pub fn execute_normalize(input: &Path, output: &Path) -> Result<Resume> {
    require_file(input, "Resume YAML file")?;

    let raw = read_yaml_file(input)?;
    info!("YAML file loaded successfully: {:?}", input);

    let resume = normalize(&raw);
    write_json(output, resume.as_value())?;
    info!("JSON data has been written to: {:?}", output);

    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TOP_LEVEL_KEYS;
    use serde_json::json;

    #[test]
    fn test_phone_dashes_normalized() {
        assert_eq!(
            normalize_phone_number("+1 555\u{2013}123\u{2013}4567"),
            "+1 555-123-4567"
        );
        for dash in UNICODE_DASHES {
            assert_eq!(normalize_phone_number(&format!("1{dash}2")), "1-2");
        }
    }

    #[test]
    fn test_phone_other_characters_untouched() {
        let phone = "(555) 123 4567 \u{2212} ext.\u{00AD}9 -";
        assert_eq!(normalize_phone_number(phone), phone);
    }

    #[test]
    fn test_missing_keys_filled_from_defaults() {
        let raw = json!({"basics": {"name": "Ada"}, "work": [{"company": "X"}]});
        let resume = normalize(&raw);
        let value = resume.as_value();

        for key in TOP_LEVEL_KEYS {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["basics"]["name"], "Ada");
        assert!(value["basics"]["headline"].is_null());
        assert!(value["basics"]["urls"]["github"].is_null());
        assert_eq!(value["work"][0]["company"], "X");
        assert_eq!(value["education"], json!([]));
    }

    #[test]
    fn test_extra_keys_preserved_after_defaults() {
        let raw = json!({
            "languages": ["English"],
            "basics": {"name": "Ada", "pronouns": "she/her"}
        });
        let value = normalize(&raw).into_value();

        assert_eq!(value["languages"], json!(["English"]));
        assert_eq!(value["basics"]["pronouns"], "she/her");

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.first().map(|k| k.as_str()), Some("basics"));
        assert_eq!(keys.last().map(|k| k.as_str()), Some("languages"));
    }

    #[test]
    fn test_wrong_types_coerced_to_defaults() {
        let raw = json!({"basics": "oops", "skills": {"a": 1}, "work": null});
        let value = normalize(&raw).into_value();

        assert!(value["basics"].is_object());
        assert_eq!(value["skills"], json!([]));
        assert_eq!(value["work"], json!([]));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let raw = json!({
            "basics": {"name": "Ada", "phone": "555\u{2014}0100", "extra": {"a": 1}},
            "work": [{"company": "X", "highlights": ["did things"]}],
            "custom": true
        });
        let once = normalize(&raw);
        let twice = normalize(once.as_value());

        assert_eq!(once, twice);
        assert_eq!(once.as_value()["basics"]["phone"], "555-0100");
    }

    #[test]
    fn test_null_document_becomes_defaults() {
        let value = normalize(&Value::Null).into_value();
        assert_eq!(value, default_resume_structure());
    }

    #[test]
    fn test_execute_normalize_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("resume.yaml");
        let output = dir.path().join("meta_resume.json");
        std::fs::write(&input, "basics:\n  name: Ada\n  phone: \"555\u{2011}0100\"\n").unwrap();

        let resume = execute_normalize(&input, &output).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(&written, resume.as_value());
        assert_eq!(written["basics"]["phone"], "555-0100");
    }
}
