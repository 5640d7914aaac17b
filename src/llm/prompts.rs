use crate::models::{text_field, Resume};

/// System prompt for the LLM (non-negotiable constraints)
pub const SYSTEM_PROMPT: &str = r#"You are tailoring a resume to a job description. You MUST follow these rules:

1. You MUST NOT invent employers, schools, projects, degrees, dates, or certifications.
2. You MUST NOT change the candidate's name, email, or phone number.
3. You MUST keep the same number of entries in education, work, and projects, in the same order.
4. You MUST NOT change company, institution, project name, start, or end fields.
5. Output MUST be the complete resume, with the same structure as the input, submitted via the submit_resume tool.

YOU MAY:
- Rewrite the headline and summary to match the role.
- Reword, reorder, and trim highlights to emphasize relevant, truthful experience.
- Reorder and regroup skills. Every skills entry must be a mapping of category to skills.
- Use keywords from the job description where the resume already supports them.

STYLE:
- Plain text only. Do not use Markdown.
- In the headline, summary, and highlights, escape LaTeX special characters (%, &, #, _, $) with a backslash.
- Copy every other field exactly as given, character for character. Never escape names, emails, phone numbers, companies, institutions, project names, or dates.
- Keep highlights to one or two lines each.

List each change you made, one line per change, in "changes"."#;

/// Build the user prompt for an enhancement request
pub fn build_enhance_prompt(resume: &Resume, job_description: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Job Description\n");
    prompt.push_str(job_description.trim());
    prompt.push_str("\n\n");

    prompt.push_str("## Resume (JSON)\n");
    prompt.push_str("```json\n");
    let resume_json = serde_json::to_string_pretty(resume.as_value())
        .unwrap_or_else(|_| resume.as_value().to_string());
    prompt.push_str(&resume_json);
    prompt.push_str("\n```\n\n");

    let locked = locked_fields(resume);
    if !locked.is_empty() {
        prompt.push_str("## Fields That Must Not Change\n");
        for line in locked {
            prompt.push_str(&format!("- {}\n", line));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Instructions\n");
    prompt.push_str(
        "Tailor the resume to the job description above and submit the full result with the submit_resume tool.\n",
    );

    prompt
}

/// Human-readable list of identity fields to keep fixed, e.g. `work[0]: Acme (2020-01 - 2022-06)`
fn locked_fields(resume: &Resume) -> Vec<String> {
    let mut lines = Vec::new();

    let name = text_field(resume.basics(), "name");
    if !name.is_empty() {
        lines.push(format!("basics.name: {}", name));
    }

    for (i, entry) in resume.work().iter().enumerate() {
        lines.push(format!(
            "work[{}]: {} ({} - {})",
            i,
            text_field(entry, "company"),
            text_field(entry, "start"),
            text_field(entry, "end")
        ));
    }
    for (i, entry) in resume.education().iter().enumerate() {
        lines.push(format!(
            "education[{}]: {} ({})",
            i,
            text_field(entry, "institution"),
            text_field(entry, "end")
        ));
    }
    for (i, entry) in resume.projects().iter().enumerate() {
        lines.push(format!("projects[{}]: {}", i, text_field(entry, "name")));
    }

    lines
}
