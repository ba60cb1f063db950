//! Pure, per-render views derived from the currently loaded matches.
//! Nothing here is cached between renders.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};

use serde::Serialize;

use crate::models::JobMatch;

/// At most this many matches are shown as cards.
pub const MAX_DISPLAYED_MATCHES: usize = 20;
const DESCRIPTION_PREVIEW_CHARS: usize = 500;
const UNTITLED_ROLE: &str = "Untitled role";
const UNKNOWN_COMPANY: &str = "Unknown company";
const NO_MATCH_REASON: &str = "-";

pub const NO_MATCHES_MESSAGE: &str = "No matches yet. Upload resume → Refresh Jobs.";
pub const NO_MISSING_SKILLS_MESSAGE: &str = "No missing skills found.";
pub const SKILL_GAP_TITLE: &str = "Skill Gap Heatmap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A passive message shown in the current render pass only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCard {
    /// Position in the loaded list; feedback refers to matches by this index.
    pub index: usize,
    pub title: String,
    pub company: String,
    pub job_link: Option<String>,
    pub description: String,
    pub match_reason: String,
    pub missing_skills: String,
}

impl MatchCard {
    pub fn from_match(index: usize, job: &JobMatch) -> Self {
        Self {
            index,
            title: job.title.clone().unwrap_or_else(|| UNTITLED_ROLE.to_string()),
            company: job
                .company
                .clone()
                .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            job_link: job.job_link.clone().filter(|link| !link.is_empty()),
            description: preview(job.description.as_deref().unwrap_or_default()),
            match_reason: job
                .match_reason
                .clone()
                .unwrap_or_else(|| NO_MATCH_REASON.to_string()),
            missing_skills: job.missing_skills().join(", "),
        }
    }
}

/// First 500 characters followed by an ellipsis.
fn preview(description: &str) -> String {
    let mut out: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

pub fn match_cards(matches: &[JobMatch]) -> Vec<MatchCard> {
    matches
        .iter()
        .take(MAX_DISPLAYED_MATCHES)
        .enumerate()
        .map(|(i, job)| MatchCard::from_match(i, job))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// Counts lowercased missing skills across all matches, skipping empty
/// entries. Sorted by count descending, ties in first-seen order.
pub fn skill_gap_histogram(matches: &[JobMatch]) -> Vec<SkillCount> {
    let mut counts: Vec<SkillCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for skill in matches.iter().flat_map(|m| m.missing_skills()) {
        if skill.is_empty() {
            continue;
        }
        let skill = skill.to_lowercase();
        match positions.get(&skill) {
            Some(&i) => counts[i].count += 1,
            None => {
                positions.insert(skill.clone(), counts.len());
                counts.push(SkillCount { skill, count: 1 });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Union of all missing skills in first-seen order.
pub fn distinct_missing_skills(matches: &[JobMatch]) -> Vec<String> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .flat_map(|m| m.missing_skills())
        .filter(|s| !s.is_empty() && seen.insert(s.as_str()))
        .cloned()
        .collect()
}

const SVG_WIDTH: usize = 640;
const SVG_LABEL_WIDTH: usize = 160;
const SVG_BAR_AREA: usize = 420;
const SVG_ROW_HEIGHT: usize = 28;
const SVG_HEADER: usize = 40;

/// Horizontal bar chart of the histogram. `None` when there is nothing to plot.
pub fn render_skill_gap_svg(histogram: &[SkillCount]) -> Option<String> {
    let max = histogram.iter().map(|s| s.count).max()?;
    let mut svg = String::new();
    write_skill_gap_svg(&mut svg, histogram, max).ok()?;
    Some(svg)
}

/// `max` is the largest count in `histogram` and must be non-zero.
fn write_skill_gap_svg(out: &mut impl Write, histogram: &[SkillCount], max: usize) -> fmt::Result {
    let height = SVG_HEADER + histogram.len() * SVG_ROW_HEIGHT + 10;

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SVG_WIDTH}" height="{height}" viewBox="0 0 {SVG_WIDTH} {height}" font-family="sans-serif" font-size="13">"#
    )?;
    writeln!(
        out,
        r#"<text x="{}" y="24" text-anchor="middle" font-size="16">{SKILL_GAP_TITLE}</text>"#,
        SVG_WIDTH / 2
    )?;

    for (row, entry) in histogram.iter().enumerate() {
        let y = SVG_HEADER + row * SVG_ROW_HEIGHT;
        let bar_width = (entry.count * SVG_BAR_AREA / max).max(1);
        let label = escape_xml(&entry.skill);
        writeln!(
            out,
            r#"<text x="{}" y="{}" text-anchor="end">{label}</text>"#,
            SVG_LABEL_WIDTH - 8,
            y + 17
        )?;
        writeln!(
            out,
            r##"<rect x="{SVG_LABEL_WIDTH}" y="{}" width="{bar_width}" height="{}" fill="#1f77b4"/>"##,
            y + 4,
            SVG_ROW_HEIGHT - 8
        )?;
        writeln!(
            out,
            r#"<text x="{}" y="{}">{}</text>"#,
            SVG_LABEL_WIDTH + bar_width + 6,
            y + 17,
            entry.count
        )?;
    }

    out.write_str("</svg>\n")
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
