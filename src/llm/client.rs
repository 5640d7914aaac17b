use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::EnhancementOutput;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const RESUME_TOOL: &str = "submit_resume";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// API root; requests go to `<base_url>/v1/messages`
    pub base_url: String,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;

        Ok(Self::new(api_key, "claude-sonnet-4-20250514".to_string()))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.3,
            max_tokens: 8192,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask for an updated resume, forcing the `submit_resume` tool for structured output
    pub async fn send_resume_request(&self, system: &str, user: &str) -> Result<EnhancementOutput> {
        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![resume_tool()],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: RESUME_TOOL.to_string(),
            }),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            anyhow::bail!("Response truncated at max_tokens ({})", self.config.max_tokens);
        }

        extract_tool_input(response)
    }
}

/// Pull the `submit_resume` tool input out of a response
fn extract_tool_input(response: AnthropicResponse) -> Result<EnhancementOutput> {
    for content in response.content {
        if content.content_type == "tool_use" && content.name.as_deref() == Some(RESUME_TOOL) {
            if let Some(input) = content.input {
                let output: EnhancementOutput = serde_json::from_value(input)
                    .context("Failed to parse tool input as an enhanced resume")?;
                return Ok(output);
            }
        }
    }

    anyhow::bail!("No tool_use response found")
}

fn resume_tool() -> Tool {
    let entries = serde_json::json!({"type": "array", "items": {"type": "object"}});
    Tool {
        name: RESUME_TOOL.to_string(),
        description: "Submit the complete tailored resume document and a list of the changes made"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "resume": {
                    "type": "object",
                    "description": "The full resume document with the same structure as the input",
                    "properties": {
                        "basics": {"type": "object"},
                        "education": entries,
                        "work": entries,
                        "projects": entries,
                        "certifications": {"type": "array"},
                        "skills": entries
                    },
                    "required": ["basics", "education", "work", "projects", "certifications", "skills"]
                },
                "changes": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "One short line per change made to the resume"
                }
            },
            "required": ["resume", "changes"]
        }),
    }
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
