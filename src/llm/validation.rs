use serde_json::Value;

use crate::models::{value_kind, EnhancementValidation, Resume, TOP_LEVEL_KEYS};

/// Configuration for checking an enhanced resume
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// `basics` fields that must come back unchanged
    pub locked_basics: Vec<String>,
    /// Per-section entry fields that must come back unchanged; the entry count is locked too
    pub locked_entries: Vec<(String, Vec<String>)>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        let fields = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        Self {
            locked_basics: fields(&["name", "email", "phone"]),
            locked_entries: vec![
                ("education".to_string(), fields(&["institution", "end"])),
                ("work".to_string(), fields(&["company", "start", "end"])),
                ("projects".to_string(), fields(&["name"])),
            ],
        }
    }
}

/// Check that the LLM kept the resume's shape and identity facts intact
pub fn validate_enhancement(
    original: &Resume,
    enhanced: &Value,
    config: &GuardConfig,
) -> EnhancementValidation {
    let mut errors = Vec::new();

    // 1. Shape: a mapping carrying every top-level section
    let Some(enhanced_map) = enhanced.as_object() else {
        return EnhancementValidation::invalid(vec![format!(
            "Enhanced resume must be a mapping, got {}",
            value_kind(enhanced)
        )]);
    };
    for key in TOP_LEVEL_KEYS {
        if !enhanced_map.contains_key(key) {
            errors.push(format!("Section '{}' is missing", key));
        }
    }

    // 2. Identity fields in basics
    let original_basics = original.basics();
    let enhanced_basics = enhanced.get("basics").unwrap_or(&Value::Null);
    for field in &config.locked_basics {
        if !same_field(original_basics, enhanced_basics, field) {
            errors.push(format!("basics.{} was changed", field));
        }
    }

    // 3. Entry counts and locked entry fields
    for (section, fields) in &config.locked_entries {
        let before = original.entries(section);
        let after = enhanced
            .get(section)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if before.len() != after.len() {
            errors.push(format!(
                "Section '{}' has {} entries, expected {}",
                section,
                after.len(),
                before.len()
            ));
            continue;
        }

        for (i, (old, new)) in before.iter().zip(after).enumerate() {
            for field in fields {
                if !same_field(old, new, field) {
                    errors.push(format!("{}[{}].{} was changed", section, i, field));
                }
            }
        }
    }

    // 4. Skills stay a list of non-empty mappings
    if let Some(skills) = enhanced.get("skills") {
        match skills.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if !entry.as_object().is_some_and(|m| !m.is_empty()) {
                        errors.push(format!("skills[{}] must be a non-empty mapping", i));
                    }
                }
            }
            None => errors.push("Section 'skills' must be a list".to_string()),
        }
    }

    if errors.is_empty() {
        EnhancementValidation::valid()
    } else {
        EnhancementValidation::invalid(errors)
    }
}

/// Missing and null compare equal
fn same_field(old: &Value, new: &Value, field: &str) -> bool {
    let old = old.get(field).unwrap_or(&Value::Null);
    let new = new.get(field).unwrap_or(&Value::Null);
    old == new
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::normalize;
    use serde_json::json;

    fn original() -> Resume {
        normalize(&json!({
            "basics": {"name": "Ada", "email": "ada@example.com", "summary": "Engineer"},
            "work": [{"company": "Acme", "start": "2020-01", "end": "2022-06", "highlights": ["a"]}],
            "projects": [{"name": "Engine"}],
            "skills": [{"languages": "Rust"}]
        }))
    }

    #[test]
    fn test_rewording_is_accepted() {
        let mut enhanced = original().into_value();
        enhanced["basics"]["summary"] = json!("Backend engineer focused on Rust");
        enhanced["work"][0]["highlights"] = json!(["Built a compiler", "Led a team"]);
        enhanced["skills"] = json!([{"languages": "Rust, Go"}, {"tools": "Docker"}]);

        let result = validate_enhancement(&original(), &enhanced, &GuardConfig::default());

        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_changed_identity_rejected() {
        let mut enhanced = original().into_value();
        enhanced["basics"]["name"] = json!("Grace");
        enhanced["work"][0]["company"] = json!("Initech");

        let result = validate_enhancement(&original(), &enhanced, &GuardConfig::default());

        assert!(!result.is_valid);
        assert!(result.errors.contains(&"basics.name was changed".to_string()));
        assert!(result.errors.contains(&"work[0].company was changed".to_string()));
    }

    #[test]
    fn test_dropped_entries_rejected() {
        let mut enhanced = original().into_value();
        enhanced["projects"] = json!([]);
        enhanced.as_object_mut().unwrap().remove("certifications");

        let result = validate_enhancement(&original(), &enhanced, &GuardConfig::default());

        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("'projects' has 0 entries")));
        assert!(result.errors.iter().any(|e| e.contains("'certifications' is missing")));
    }

    #[test]
    fn test_non_mapping_rejected() {
        let result = validate_enhancement(&original(), &json!([1, 2]), &GuardConfig::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_empty_skill_entry_rejected() {
        let mut enhanced = original().into_value();
        enhanced["skills"] = json!([{}]);

        let result = validate_enhancement(&original(), &enhanced, &GuardConfig::default());

        assert_eq!(result.errors, vec!["skills[0] must be a non-empty mapping".to_string()]);
    }
}
