use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static INTRODUCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\introduction\s*\[.*?\]").expect("valid regex"));
static SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\summary\s*\{.*?\}").expect("valid regex"));
static EDUCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\\begin\{educationSection\}\{[^}]+\})(.*?)(\\end\{educationSection\})")
        .expect("valid regex")
});
static SKILLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\\begin\{skillsSection\}\{[^}]+\})(.*?)(\\end\{skillsSection\})")
        .expect("valid regex")
});
static EXPERIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(\\begin\{experienceSection\}\{\s*Professional Experience\s*\})(.*?)(\\end\{experienceSection\})",
    )
    .expect("valid regex")
});
static PROJECTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)(\\begin\{experienceSection\}\{\s*Academic\s+projects\s*\})(.*?)(\\end\{experienceSection\})",
    )
    .expect("valid regex")
});

/// Named regions of the LaTeX template that the renderer replaces wholesale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionKind {
    /// `\introduction[...]` command with contact fields
    Introduction,
    /// `\summary{...}` command
    Summary,
    /// `educationSection` environment
    Education,
    /// `skillsSection` environment
    Skills,
    /// `experienceSection{Professional Experience}` environment
    Experience,
    /// `experienceSection{Academic projects}` environment
    Projects,
}

impl RegionKind {
    pub const ALL: [RegionKind; 6] = [
        RegionKind::Introduction,
        RegionKind::Summary,
        RegionKind::Education,
        RegionKind::Skills,
        RegionKind::Experience,
        RegionKind::Projects,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RegionKind::Introduction => "introduction",
            RegionKind::Summary => "summary",
            RegionKind::Education => "education",
            RegionKind::Skills => "skills",
            RegionKind::Experience => "professional experience",
            RegionKind::Projects => "academic projects",
        }
    }

    /// Block regions keep their `\begin`/`\end` lines; inline regions are replaced whole
    pub fn is_block(&self) -> bool {
        !matches!(self, RegionKind::Introduction | RegionKind::Summary)
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            RegionKind::Introduction => &INTRODUCTION,
            RegionKind::Summary => &SUMMARY,
            RegionKind::Education => &EDUCATION,
            RegionKind::Skills => &SKILLS,
            RegionKind::Experience => &EXPERIENCE,
            RegionKind::Projects => &PROJECTS,
        }
    }
}

/// A matched region. `opening + body + closing` reproduces the source text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    /// `\begin{...}{...}` line of a block region; empty for inline regions
    pub opening: String,
    /// Current content between opening and closing
    pub body: String,
    /// `\end{...}` of a block region; empty for inline regions
    pub closing: String,
}

impl Region {
    fn from_captures(kind: RegionKind, caps: &Captures<'_>) -> Self {
        if kind.is_block() {
            Self {
                kind,
                opening: caps[1].to_string(),
                body: caps[2].to_string(),
                closing: caps[3].to_string(),
            }
        } else {
            Self {
                kind,
                opening: String::new(),
                body: caps[0].to_string(),
                closing: String::new(),
            }
        }
    }

    /// The region as it appeared in the template
    pub fn source(&self) -> String {
        format!("{}{}{}", self.opening, self.body, self.closing)
    }

    /// The region with its content replaced by `fill`
    pub fn substitute(&self, fill: &str) -> String {
        if self.kind.is_block() {
            format!("{}\n{}\n{}", self.opening, fill, self.closing)
        } else {
            fill.to_string()
        }
    }
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Region(Region),
}

/// A LaTeX template parsed once into literal text and named region slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexTemplate {
    pub segments: Vec<Segment>,
}

impl TexTemplate {
    /// Split template text into segments.
    ///
    /// Every occurrence of every region pattern becomes a slot. Where two
    /// matches overlap, the one starting first wins.
    pub fn parse(text: &str) -> Self {
        let mut matches: Vec<(usize, usize, Region)> = Vec::new();
        for kind in RegionKind::ALL {
            for caps in kind.pattern().captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                matches.push((whole.start(), whole.end(), Region::from_captures(kind, &caps)));
            }
        }
        matches.sort_by_key(|(start, end, _)| (*start, *end));

        let mut segments = Vec::new();
        let mut cursor = 0;
        for (start, end, region) in matches {
            if start < cursor {
                continue;
            }
            if start > cursor {
                segments.push(Segment::Literal(text[cursor..start].to_string()));
            }
            segments.push(Segment::Region(region));
            cursor = end;
        }
        if cursor < text.len() {
            segments.push(Segment::Literal(text[cursor..].to_string()));
        }

        Self { segments }
    }

    /// All region slots in document order
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Region(r) => Some(r),
            Segment::Literal(_) => None,
        })
    }

    pub fn contains(&self, kind: RegionKind) -> bool {
        self.regions().any(|r| r.kind == kind)
    }

    /// Produce the final text. Regions without a fill keep their original content.
    pub fn render(&self, fills: &HashMap<RegionKind, String>) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Region(region) => match fills.get(&region.kind) {
                    Some(fill) => output.push_str(&region.substitute(fill)),
                    None => output.push_str(&region.source()),
                },
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r"\documentclass{resume}
\begin{document}
\introduction[
    fullname={Old Name},
    email={old@example.com}
]
\summary{Old summary}
\begin{educationSection}{Education}
old education
\end{educationSection}
\begin{experienceSection}{Professional Experience}
old work
\end{experienceSection}
\begin{experienceSection}{Academic Projects}
old projects
\end{experienceSection}
\end{document}
";

    #[test]
    fn test_parse_finds_regions_in_order() {
        let template = TexTemplate::parse(TEMPLATE);
        let kinds: Vec<RegionKind> = template.regions().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RegionKind::Introduction,
                RegionKind::Summary,
                RegionKind::Education,
                RegionKind::Experience,
                RegionKind::Projects,
            ]
        );
        assert!(!template.contains(RegionKind::Skills));
    }

    #[test]
    fn test_render_without_fills_is_identity() {
        let template = TexTemplate::parse(TEMPLATE);
        assert_eq!(template.render(&HashMap::new()), TEMPLATE);
    }

    #[test]
    fn test_block_region_keeps_delimiters() {
        let template = TexTemplate::parse(TEMPLATE);
        let mut fills = HashMap::new();
        fills.insert(RegionKind::Education, "NEW".to_string());
        let output = template.render(&fills);
        assert!(output.contains("\\begin{educationSection}{Education}\nNEW\n\\end{educationSection}"));
        assert!(!output.contains("old education"));
        assert!(output.contains("old work"));
    }

    #[test]
    fn test_projects_pattern_is_case_insensitive() {
        let template = TexTemplate::parse(TEMPLATE);
        let projects = template
            .regions()
            .find(|r| r.kind == RegionKind::Projects)
            .unwrap();
        assert_eq!(projects.body, "\nold projects\n");
    }

    #[test]
    fn test_inline_region_replaced_whole() {
        let template = TexTemplate::parse(TEMPLATE);
        let mut fills = HashMap::new();
        fills.insert(RegionKind::Summary, "\\summary{New}".to_string());
        let output = template.render(&fills);
        assert!(output.contains("\\summary{New}\n"));
        assert!(!output.contains("Old summary"));
    }
}
