use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Top-level sections every normalized resume carries
pub const TOP_LEVEL_KEYS: [&str; 6] = [
    "basics",
    "education",
    "work",
    "projects",
    "certifications",
    "skills",
];

/// The default resume shape. Missing fields are filled from here during normalization.
pub fn default_resume_structure() -> Value {
    json!({
        "basics": {
            "name": null,
            "headline": null,
            "email": null,
            "phone": null,
            "location": {
                "city": null,
                "region": null,
                "country": null
            },
            "urls": {
                "linkedin": null,
                "github": null
            },
            "summary": null
        },
        "education": [],
        "work": [],
        "projects": [],
        "certifications": [],
        "skills": []
    })
}

/// A resume document: a nested mapping keyed by [`TOP_LEVEL_KEYS`]
///
/// The document stays an untyped JSON tree so unknown keys survive every
/// stage untouched; the accessors below give the renderer typed views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resume(Value);

impl Resume {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `basics` mapping, or `null` if absent
    pub fn basics(&self) -> &Value {
        self.0.get("basics").unwrap_or(&Value::Null)
    }

    /// Whether a top-level key exists at all
    pub fn has_section(&self, key: &str) -> bool {
        self.0.get(key).is_some()
    }

    /// Entries of a list-valued top-level section (empty if absent or not a list)
    pub fn entries(&self, key: &str) -> &[Value] {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn education(&self) -> &[Value] {
        self.entries("education")
    }

    pub fn work(&self) -> &[Value] {
        self.entries("work")
    }

    pub fn projects(&self) -> &[Value] {
        self.entries("projects")
    }

    pub fn skills(&self) -> &[Value] {
        self.entries("skills")
    }
}

/// Read a scalar field as display text. Null, missing and nested values render empty.
pub fn text_field(value: &Value, key: &str) -> String {
    value.get(key).map(scalar_text).unwrap_or_default()
}

/// Display text of a scalar value
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Read a list of strings (e.g. `highlights`), skipping non-scalar items
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(scalar_text)
                .collect()
        })
        .unwrap_or_default()
}

/// Short type name used in diagnostics
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_structure_has_all_sections() {
        let defaults = default_resume_structure();
        for key in TOP_LEVEL_KEYS {
            assert!(defaults.get(key).is_some(), "missing {key}");
        }
        assert!(defaults["basics"]["location"]["city"].is_null());
    }

    #[test]
    fn test_text_field_renders_scalars() {
        let entry = json!({"gpa": 3.8, "degree": "BSc", "end": null, "flag": true});
        assert_eq!(text_field(&entry, "gpa"), "3.8");
        assert_eq!(text_field(&entry, "degree"), "BSc");
        assert_eq!(text_field(&entry, "end"), "");
        assert_eq!(text_field(&entry, "missing"), "");
        assert_eq!(text_field(&entry, "flag"), "true");
    }

    #[test]
    fn test_entries_tolerates_wrong_types() {
        let resume = Resume::from_value(json!({"work": "oops", "projects": [{"name": "x"}]}));
        assert!(resume.work().is_empty());
        assert_eq!(resume.projects().len(), 1);
        assert!(resume.education().is_empty());
        assert!(resume.basics().is_null());
    }
}
