use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool input returned by the LLM for a resume enhancement request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementOutput {
    /// The complete updated resume document
    pub resume: Value,
    /// Short descriptions of what was changed
    #[serde(default)]
    pub changes: Vec<String>,
}

/// Result of checking an enhanced resume against the original
#[derive(Debug, Clone)]
pub struct EnhancementValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl EnhancementValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enhancement_output() {
        let json = r#"{
            "resume": {"basics": {"name": "Ada"}, "skills": [{"languages": "Rust"}]},
            "changes": ["Reworded summary toward backend roles"]
        }"#;

        let output: EnhancementOutput = serde_json::from_str(json).unwrap();

        assert_eq!(output.resume["basics"]["name"], "Ada");
        assert_eq!(output.changes.len(), 1);
    }

    #[test]
    fn test_changes_default_to_empty() {
        let output: EnhancementOutput = serde_json::from_str(r#"{"resume": {}}"#).unwrap();
        assert!(output.changes.is_empty());
    }
}
