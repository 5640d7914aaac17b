use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::io::{read_yaml_file, require_file};
use crate::models::value_kind;

/// A structural mismatch between the resume and the template schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Expected a mapping at '{path}', but got {found}")]
    ExpectedMapping { path: String, found: &'static str },

    #[error("Expected a list at '{path}', but got {found}")]
    ExpectedList { path: String, found: &'static str },

    #[error("Missing key '{path}' in resume YAML")]
    MissingKey { path: String },

    #[error("The 'skills' section at '{path}' must be a non-empty list")]
    EmptySkills { path: String },

    #[error("Each entry in '{path}[{index}]' must be a mapping with at least one key-value pair")]
    InvalidSkillEntry { path: String, index: usize },
}

/// Check that `actual` has the shape described by `template`.
///
/// - Mapping: every template key must be present unless its template value is
///   empty (`null`, `""`, `[]`, `{}`), which marks it optional.
/// - List: each element is checked against the template's first element when
///   that element is a mapping.
/// - `skills` keys get their own rule: a non-empty list of non-empty mappings.
///
/// Stops at the first mismatch.
pub fn validate_structure(template: &Value, actual: &Value) -> Result<(), ValidationError> {
    compare_structure(template, actual, "")
}

fn compare_structure(template: &Value, actual: &Value, path: &str) -> Result<(), ValidationError> {
    match template {
        Value::Object(expected) => {
            let Some(actual_map) = actual.as_object() else {
                return Err(ValidationError::ExpectedMapping {
                    path: display_path(path),
                    found: value_kind(actual),
                });
            };

            for (key, template_value) in expected {
                let child = child_path(path, key);
                let Some(actual_value) = actual_map.get(key) else {
                    if is_optional(template_value) {
                        continue;
                    }
                    return Err(ValidationError::MissingKey { path: child });
                };

                if key == "skills" {
                    validate_skills_section(actual_value, &child)?;
                } else {
                    compare_structure(template_value, actual_value, &child)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => {
            let Some(actual_items) = actual.as_array() else {
                return Err(ValidationError::ExpectedList {
                    path: display_path(path),
                    found: value_kind(actual),
                });
            };

            if let Some(item_schema @ Value::Object(_)) = items.first() {
                for (i, item) in actual_items.iter().enumerate() {
                    compare_structure(item_schema, item, &format!("{path}[{i}]"))?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_skills_section(skills: &Value, path: &str) -> Result<(), ValidationError> {
    let entries = match skills.as_array() {
        Some(entries) if !entries.is_empty() => entries,
        _ => {
            return Err(ValidationError::EmptySkills {
                path: path.to_string(),
            });
        }
    };

    for (index, entry) in entries.iter().enumerate() {
        let non_empty_mapping = entry.as_object().is_some_and(|m| !m.is_empty());
        if !non_empty_mapping {
            return Err(ValidationError::InvalidSkillEntry {
                path: path.to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// Empty template values mark a field optional
fn is_optional(template_value: &Value) -> bool {
    match template_value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

/// Execute Stage 0: load the resume and schema YAML files and compare their structure
pub fn execute_validate(resume_path: &Path, template_path: &Path) -> Result<()> {
    require_file(resume_path, "Resume YAML file")?;
    require_file(template_path, "Template YAML file")?;

    let template = read_yaml_file(template_path)?;
    let actual = read_yaml_file(resume_path)?;

    validate_structure(&template, &actual).context("YAML validation failed")?;
    info!("Resume YAML structure is valid");
    Ok(())
}
