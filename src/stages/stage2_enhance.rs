use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::io::{read_json_file, read_text, require_file, write_json};
use crate::llm::{
    build_enhance_prompt, validate_enhancement, AnthropicClient, GuardConfig, SYSTEM_PROMPT,
};
use crate::models::Resume;
use crate::stages::normalize;

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct EnhanceConfig {
    /// Output checks applied to every response
    pub guard: GuardConfig,
    /// Maximum re-asks on request or validation failure
    pub max_retries: u32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            guard: GuardConfig::default(),
            max_retries: 2,
        }
    }
}

/// Result of Stage 2 processing
#[derive(Debug)]
pub struct EnhanceResult {
    /// The accepted resume, re-merged against the default structure
    pub resume: Resume,
    /// Changes reported by the model
    pub changes: Vec<String>,
    /// Number of requests made, including the accepted one
    pub attempts: u32,
}

/// Execute Stage 2: tailor the resume to a job description
///
/// 1. Build the prompt from the resume and job description
/// 2. Call Claude with the `submit_resume` tool
/// 3. Check the returned document keeps the original's shape and identity facts
/// 4. Retry up to `max_retries` times; give up with the last error
pub async fn execute_enhance(
    client: &AnthropicClient,
    resume: &Resume,
    job_description: &str,
    config: &EnhanceConfig,
) -> Result<EnhanceResult> {
    let prompt = build_enhance_prompt(resume, job_description);

    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            info!("Enhancement retry {} of {}", attempt, config.max_retries);
        }

        match client.send_resume_request(SYSTEM_PROMPT, &prompt).await {
            Ok(output) => {
                let validation = validate_enhancement(resume, &output.resume, &config.guard);

                if validation.is_valid {
                    return Ok(EnhanceResult {
                        resume: normalize(&output.resume),
                        changes: output.changes,
                        attempts: attempt + 1,
                    });
                }

                warn!("Enhanced resume rejected: {:?}", validation.errors);
                last_error = Some(anyhow::anyhow!(
                    "Validation failed: {}",
                    validation.errors.join("; ")
                ));
            }
            Err(e) => {
                warn!("Enhancement request failed: {:#}", e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow::anyhow!("Unknown error"))
        .context(format!(
            "Resume enhancement failed after {} attempts",
            config.max_retries + 1
        )))
}

/// Stage 2 over files: read the resume JSON and job description, enhance, write the JSON back
pub async fn execute_enhance_file(
    client: &AnthropicClient,
    resume_json: &Path,
    job_description_file: &Path,
    config: &EnhanceConfig,
) -> Result<EnhanceResult> {
    require_file(resume_json, "Resume JSON file")?;
    require_file(job_description_file, "Job description file")?;

    let resume = Resume::from_value(read_json_file(resume_json)?);
    let job_description = read_text(job_description_file)?;
    info!(
        "Enhancing resume with {} ({} characters of job description)",
        client.model(),
        job_description.len()
    );

    let result = execute_enhance(client, &resume, &job_description, config).await?;
    for change in &result.changes {
        info!("Change: {}", change);
    }

    write_json(resume_json, result.resume.as_value())?;
    info!("Updated resume written to: {:?}", resume_json);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::llm::AnthropicConfig;

    type StubState = (Arc<Vec<Value>>, Arc<AtomicUsize>);

    /// Serve canned Messages API responses in order, repeating the last one
    async fn stub_api(responses: Vec<Value>) -> (AnthropicClient, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v1/messages", post(respond))
            .with_state((Arc::new(responses), calls.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let config = AnthropicConfig {
            base_url: format!("http://{addr}"),
            ..AnthropicConfig::new("test-key".to_string(), "test-model".to_string())
        };
        (AnthropicClient::new(config), calls)
    }

    async fn respond(State((responses, calls)): State<StubState>) -> Json<Value> {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        Json(responses[n.min(responses.len() - 1)].clone())
    }

    fn tool_response(resume: Value) -> Value {
        json!({
            "content": [{
                "type": "tool_use",
                "id": "toolu_01",
                "name": "submit_resume",
                "input": {"resume": resume, "changes": ["Rewrote summary for the role"]}
            }],
            "stop_reason": "tool_use"
        })
    }

    fn original() -> Resume {
        normalize(&json!({
            "basics": {"name": "Ada", "email": "ada@example.com", "summary": "Engineer"},
            "work": [{"company": "Acme", "start": "2020-01", "end": "2022-06", "highlights": ["a"]}]
        }))
    }

    fn renamed(resume: &Resume) -> Value {
        let mut value = resume.as_value().clone();
        value["basics"]["name"] = json!("Grace");
        value
    }

    #[test]
    fn test_enhance_config_default() {
        let config = EnhanceConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.guard.locked_basics.len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_output_is_retried_until_accepted() {
        let resume = original();
        let mut accepted = resume.as_value().clone();
        accepted["basics"]["summary"] = json!("Backend engineer focused on Rust services");
        accepted["basics"].as_object_mut().unwrap().remove("headline");

        let (client, calls) = stub_api(vec![
            tool_response(renamed(&resume)),
            tool_response(renamed(&resume)),
            tool_response(accepted),
        ])
        .await;

        let result = execute_enhance(&client, &resume, "Rust role", &EnhanceConfig::default())
            .await
            .unwrap();

        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.changes, vec!["Rewrote summary for the role".to_string()]);
        assert_eq!(
            result.resume.basics()["summary"],
            json!("Backend engineer focused on Rust services")
        );
        // Accepted output is merged back onto the default structure
        assert_eq!(result.resume.basics()["headline"], Value::Null);
        assert!(result.resume.basics().get("headline").is_some());
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_fatal() {
        let resume = original();
        let (client, calls) = stub_api(vec![tool_response(renamed(&resume))]).await;

        let err = execute_enhance(&client, &resume, "Rust role", &EnhanceConfig::default())
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("failed after 3 attempts"), "{message}");
        assert!(message.contains("basics.name was changed"), "{message}");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retries_makes_one_request() {
        let resume = original();
        let (client, calls) = stub_api(vec![tool_response(renamed(&resume))]).await;
        let config = EnhanceConfig {
            max_retries: 0,
            ..Default::default()
        };

        let err = execute_enhance(&client, &resume, "Rust role", &config).await.unwrap_err();

        assert!(format!("{:#}", err).contains("failed after 1 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enhance_file_writes_accepted_resume() {
        let dir = tempfile::tempdir().unwrap();
        let resume_json = dir.path().join("meta_resume.json");
        let jd = dir.path().join("job.txt");
        let resume = original();
        crate::io::write_json(&resume_json, resume.as_value()).unwrap();
        std::fs::write(&jd, "Rust role").unwrap();

        let mut accepted = resume.as_value().clone();
        accepted["basics"]["summary"] = json!("Tailored");
        let (client, _) = stub_api(vec![tool_response(accepted)]).await;

        let result = execute_enhance_file(&client, &resume_json, &jd, &EnhanceConfig::default())
            .await
            .unwrap();

        assert_eq!(result.attempts, 1);
        let written = read_json_file(&resume_json).unwrap();
        assert_eq!(written["basics"]["summary"], json!("Tailored"));
    }
}
