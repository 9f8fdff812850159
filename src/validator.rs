use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzer::strip_markup;
use crate::collaborators::{ContentValidator, ValidationContext, ValidationResult};

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static AI_DISCLOSURE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\bas an ai\b").unwrap(),
        Regex::new(r"(?i)\bas a language model\b").unwrap(),
        Regex::new(r"(?i)\bi don't have personal\b").unwrap(),
        Regex::new(r"(?i)\bi cannot browse\b").unwrap(),
        Regex::new(r"(?i)\bas of my (last |knowledge )?cutoff\b").unwrap(),
        Regex::new(r"AIとして|言語モデルとして").unwrap(),
    ]
});

static CHAT_RESIDUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)would you like me to").unwrap(),
        Regex::new(r"(?i)let me know if").unwrap(),
        Regex::new(r"(?i)i hope this helps").unwrap(),
        Regex::new(r"(?i)here is (?:the|your) article").unwrap(),
    ]
});

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\[insert [^\]]*\]|\[describe [^\]]*\]|\[url[^\]]*\]|\[hotel name\]|\[todo[^\]]*\]|【[^】]*を入力】|〇〇",
    )
    .unwrap()
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CONTEXT_WINDOW_CHARS: usize = 60;

fn context_around(text: &str, start: usize, end: usize, width: usize) -> String {
    let mid = (start + end) / 2;
    let half = width / 2;
    let ctx_start = snap_to_char_boundary(text, mid.saturating_sub(half), false);
    let ctx_end = snap_to_char_boundary(text, std::cmp::min(text.len(), mid + half), true);

    let snippet = text[ctx_start..ctx_end].replace('\n', " ");
    let prefix = if ctx_start > 0 { "..." } else { "" };
    let suffix = if ctx_end < text.len() { "..." } else { "" };
    format!("{prefix}{snippet}{suffix}")
}

/// Snap a byte offset to a valid char boundary, forward or backward.
fn snap_to_char_boundary(text: &str, pos: usize, forward: bool) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while !text.is_char_boundary(p) {
        if forward {
            p += 1;
        } else {
            p -= 1;
        }
    }
    p
}

struct Finding {
    issue: String,
    instruction: String,
}

fn first_match<'a>(patterns: impl IntoIterator<Item = &'a Regex>, text: &str) -> Option<String> {
    patterns
        .into_iter()
        .find_map(|re| re.find(text))
        .map(|m| context_around(text, m.start(), m.end(), CONTEXT_WINDOW_CHARS))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rejects drafts that are too short, never name the hotel, disclose they were
/// machine-written, or still contain template placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicContentValidator;

impl ContentValidator for BasicContentValidator {
    fn validate(&self, content: &str, ctx: &ValidationContext) -> ValidationResult {
        let plain = strip_markup(content);
        let mut findings: Vec<Finding> = Vec::new();

        let length = plain.trim().chars().count();
        if length < ctx.min_length {
            findings.push(Finding {
                issue: format!("article is {length} characters, minimum is {}", ctx.min_length),
                instruction: format!(
                    "Expand the article to at least {} characters with concrete detail.",
                    ctx.min_length
                ),
            });
        }

        let name = ctx.hotel_name.trim();
        if !name.is_empty() && !plain.to_lowercase().contains(&name.to_lowercase()) {
            findings.push(Finding {
                issue: format!("hotel name '{name}' never appears"),
                instruction: format!("Mention {name} by name in the introduction and conclusion."),
            });
        }

        if let Some(context) = first_match(AI_DISCLOSURE_PATTERNS.iter(), &plain) {
            findings.push(Finding {
                issue: format!("AI self-disclosure: {context}"),
                instruction: "Remove every statement about being an AI or language model.".to_string(),
            });
        }

        if let Some(context) = first_match(CHAT_RESIDUE_PATTERNS.iter(), &plain) {
            findings.push(Finding {
                issue: format!("chat residue: {context}"),
                instruction: "Output only the article, without remarks addressed to the requester.".to_string(),
            });
        }

        if let Some(m) = PLACEHOLDER_RE.find(&plain) {
            findings.push(Finding {
                issue: format!("unfilled placeholder '{}'", m.as_str()),
                instruction: "Replace every placeholder with real content.".to_string(),
            });
        }

        if findings.is_empty() {
            return ValidationResult::passed();
        }

        let mut improvement = String::from("The previous draft needs these fixes:");
        for f in &findings {
            improvement.push_str("\n- ");
            improvement.push_str(&f.instruction);
        }
        ValidationResult::failed(findings.into_iter().map(|f| f.issue).collect(), improvement)
    }
}
