use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::io::{read_json_file, read_text, require_file, write_text};
use crate::models::{scalar_text, string_list, text_field, RegionKind, Resume, TexTemplate};

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct RenderResult {
    /// The rendered LaTeX document
    pub tex: String,
    /// Regions that were substituted
    pub filled: Vec<RegionKind>,
    /// Regions the template does not contain
    pub absent: Vec<RegionKind>,
}

/// Execute Stage 3: substitute the resume into the template's regions
///
/// Regions missing from the template are left alone; sections missing from
/// the resume leave their region untouched.
pub fn execute_render(resume: &Resume, template_text: &str) -> RenderResult {
    let template = TexTemplate::parse(template_text);
    let fills = build_region_fills(resume);

    let mut filled = Vec::new();
    let mut absent = Vec::new();
    for kind in RegionKind::ALL {
        if !template.contains(kind) {
            debug!("Template has no {} region", kind.name());
            absent.push(kind);
        } else if fills.contains_key(&kind) {
            info!("Updated {} section", kind.name());
            filled.push(kind);
        }
    }

    RenderResult {
        tex: template.render(&fills),
        filled,
        absent,
    }
}

/// Stage 3 over files: resume JSON + template → `.tex`
pub fn render_file(resume_json: &Path, template_path: &Path, output: &Path) -> Result<RenderResult> {
    require_file(resume_json, "Resume JSON file")?;
    require_file(template_path, "LaTeX template file")?;

    let resume = Resume::from_value(read_json_file(resume_json)?);
    let template_text = read_text(template_path)?;
    info!("Loaded LaTeX template from {:?}", template_path);

    let result = execute_render(&resume, &template_text);
    write_text(output, &result.tex)?;
    info!("Final LaTeX file generated: {:?}", output);

    Ok(result)
}

/// Build the replacement text for every region the resume has data for
pub fn build_region_fills(resume: &Resume) -> HashMap<RegionKind, String> {
    let basics = resume.basics();
    let mut fills = HashMap::new();

    fills.insert(RegionKind::Introduction, introduction(basics));
    fills.insert(RegionKind::Summary, summary(basics));
    if resume.has_section("education") {
        fills.insert(RegionKind::Education, education_items(resume.education()));
    }
    if resume.has_section("skills") {
        fills.insert(RegionKind::Skills, skill_items(resume.skills()));
    }
    if resume.has_section("work") {
        fills.insert(RegionKind::Experience, experience_items(resume.work()));
    }
    if resume.has_section("projects") {
        fills.insert(RegionKind::Projects, project_items(resume.projects()));
    }

    fills
}

/// Reformat `YYYY-MM` as `Mon YYYY`; anything else passes through unchanged
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(e) => {
            warn!("Date conversion failed for {:?}: {}", raw, e);
            raw.to_string()
        }
    }
}

fn duration(entry: &Value) -> String {
    format!(
        "{} - {}",
        format_date(&text_field(entry, "start")),
        format_date(&text_field(entry, "end"))
    )
}

fn introduction(basics: &Value) -> String {
    let urls = basics.get("urls").unwrap_or(&Value::Null);
    format!(
        "\\introduction[\n    fullname={{{}}},\n    email={{{}}},\n    phone={{{}}},\n    linkedin={{{}}},\n    github={{{}}}\n]",
        text_field(basics, "name"),
        text_field(basics, "email"),
        text_field(basics, "phone"),
        text_field(urls, "linkedin"),
        text_field(urls, "github"),
    )
}

fn summary(basics: &Value) -> String {
    let text = text_field(basics, "summary").trim().replace('\n', " ");
    format!("\\summary{{{}}}", text)
}

fn education_items(entries: &[Value]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut items = String::new();
    for edu in entries {
        items.push_str(&format!(
            "\\educationItem[\n    university={{{}}},\n    graduation={{{}}},\n    grade={{{} GPA}},\n    program={{{}, {}}}\n]",
            text_field(edu, "institution"),
            format_date(&text_field(edu, "end")),
            text_field(edu, "gpa"),
            text_field(edu, "degree"),
            text_field(edu, "field"),
        ));
    }
    items.push_str("\n\\vspace{-\\baselineskip}");
    items
}

fn skill_items(entries: &[Value]) -> String {
    let mut items = Vec::new();
    for entry in entries {
        let Some(categories) = entry.as_object() else {
            continue;
        };
        for (key, value) in categories {
            items.push(format!(
                "\\skillItem[\n    category={{{}}},\n    skills={{{}}}\n]",
                skill_category(key),
                skill_list(value),
            ));
        }
    }
    items.join("\n\\\\\n") + if items.is_empty() { "" } else { "\n" }
}

/// `programming_languages` → `Programming languages`
fn skill_category(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn skill_list(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}

fn bullet_list(highlights: &[String], preamble: &str) -> String {
    if highlights.is_empty() {
        return String::new();
    }
    let mut bullets = format!("\\begin{{itemize}}\n{preamble}");
    for point in highlights {
        bullets.push_str(&format!("    \\item {}\n", point));
    }
    bullets.push_str("\\end{itemize}");
    bullets
}

fn experience_items(entries: &[Value]) -> String {
    entries
        .iter()
        .map(|work| {
            let header = format!(
                "\\experienceItem[\n    company={{{}}},\n    location={{{}}},\n    position={{{}}},\n    duration={{{}}}\n]",
                text_field(work, "company"),
                text_field(work, "location"),
                text_field(work, "position"),
                duration(work),
            );
            let bullets = bullet_list(
                &string_list(work, "highlights"),
                "    \\itemsep -6pt {}\n",
            );
            format!("{}\n{}", header, bullets)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn project_items(entries: &[Value]) -> String {
    entries
        .iter()
        .map(|proj| {
            let url = text_field(proj, "url");
            let key_highlight = if url.is_empty() {
                String::new()
            } else {
                format!("GitHub - {}", url)
            };
            let header = format!(
                "\\projectItem[\n    title={{{}}},\n    duration={{{}}},\n    keyHighlight={{{}}}\n]",
                text_field(proj, "name"),
                duration(proj),
                key_highlight,
            );
            let bullets = bullet_list(
                &string_list(proj, "highlights"),
                "    \\vspace{-0.5em}\n    \\itemsep -6pt {}\n",
            );
            format!("{}\n{}", header, bullets)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
