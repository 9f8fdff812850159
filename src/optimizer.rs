use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Category, WeakPoint};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Named prompt-instruction fragment that counteracts a weak point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Timeline,
    Emotion,
    Purpose,
    Scene,
    FirstPerson,
    ObjectiveData,
    FiveSenses,
    Cuisine,
    Facility,
    Faq,
    Cta,
    ProsCons,
}

const ALL_PATTERNS: [Pattern; 12] = [
    Pattern::Timeline,
    Pattern::Emotion,
    Pattern::Purpose,
    Pattern::Scene,
    Pattern::FirstPerson,
    Pattern::ObjectiveData,
    Pattern::FiveSenses,
    Pattern::Cuisine,
    Pattern::Facility,
    Pattern::Faq,
    Pattern::Cta,
    Pattern::ProsCons,
];

impl Pattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::Timeline => "timeline",
            Pattern::Emotion => "emotion",
            Pattern::Purpose => "purpose",
            Pattern::Scene => "scene",
            Pattern::FirstPerson => "first_person",
            Pattern::ObjectiveData => "objective_data",
            Pattern::FiveSenses => "five_senses",
            Pattern::Cuisine => "cuisine",
            Pattern::Facility => "facility",
            Pattern::Faq => "faq",
            Pattern::Cta => "cta",
            Pattern::ProsCons => "pros_cons",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ALL_PATTERNS
            .iter()
            .copied()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| format!("unknown pattern '{name}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostLevel {
    #[default]
    Normal,
    Strong,
    Maximum,
}

impl BoostLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            BoostLevel::Normal => "normal",
            BoostLevel::Strong => "strong",
            BoostLevel::Maximum => "maximum",
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            BoostLevel::Normal => 1.0,
            BoostLevel::Strong => 1.3,
            BoostLevel::Maximum => 1.5,
        }
    }
}

impl fmt::Display for BoostLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoostLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "default" => Ok(BoostLevel::Normal),
            "strong" => Ok(BoostLevel::Strong),
            "maximum" | "max" => Ok(BoostLevel::Maximum),
            other => Err(format!("unknown boost level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    pub weak_points: Vec<WeakPoint>,
    pub boost_level: BoostLevel,
    /// Applied in addition to the weak-point patterns.
    pub force_patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// The augmented prompt. Callers send this, not the input prompt.
    pub prompt: String,
    pub patterns_applied: Vec<Pattern>,
    pub boost_level: BoostLevel,
    /// Heuristic estimate of total-score gain, not a guarantee.
    pub predicted_improvement: Option<f64>,
}

// ---------------------------------------------------------------------------
// Mapping table
// ---------------------------------------------------------------------------

/// Weak point to reinforcement pattern. Some C-axis categories reuse H/Q
/// patterns: headings -> timeline, keyphrase -> facility, price -> objective_data.
pub fn pattern_for(weak_point: WeakPoint) -> Pattern {
    match weak_point.category {
        Category::Timeline => Pattern::Timeline,
        Category::Emotion => Pattern::Emotion,
        Category::Purpose => Pattern::Purpose,
        Category::Scene => Pattern::Scene,
        Category::FirstPerson => Pattern::FirstPerson,
        Category::ObjectiveData => Pattern::ObjectiveData,
        Category::FiveSenses => Pattern::FiveSenses,
        Category::Cuisine => Pattern::Cuisine,
        Category::Facility => Pattern::Facility,
        Category::Headings => Pattern::Timeline,
        Category::Keyphrase => Pattern::Facility,
        Category::Faq => Pattern::Faq,
        Category::Cta => Pattern::Cta,
        Category::ProsCons => Pattern::ProsCons,
        Category::Price => Pattern::ObjectiveData,
    }
}

/// Mapped patterns in weak-point order, first occurrence kept.
pub fn patterns_for(weak_points: &[WeakPoint]) -> Vec<Pattern> {
    dedup(weak_points.iter().map(|wp| pattern_for(*wp)))
}

fn dedup(patterns: impl IntoIterator<Item = Pattern>) -> Vec<Pattern> {
    let mut out: Vec<Pattern> = Vec::new();
    for p in patterns {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Instruction blocks
// ---------------------------------------------------------------------------

struct PatternSpec {
    heading: &'static str,
    instruction: &'static str,
    required: &'static str,
    expected_gain: f64,
}

fn spec(pattern: Pattern) -> PatternSpec {
    match pattern {
        Pattern::Timeline => PatternSpec {
            heading: "Timeline narration",
            instruction: "Tell the stay at {hotel} in the order it happened: arrival and check-in, the evening, the next morning, check-out. Give each stage its own section heading.",
            required: "at least 3 explicit time markers and at least 4 section headings",
            expected_gain: 5.0,
        },
        Pattern::Emotion => PatternSpec {
            heading: "Emotional response",
            instruction: "After each key moment, write how it felt in first person: what surprised, delighted or relaxed you, and why.",
            required: "at least 4 sentences that name a specific feeling",
            expected_gain: 5.0,
        },
        Pattern::Purpose => PatternSpec {
            heading: "Purpose of the stay",
            instruction: "Open by stating why you stayed (anniversary, family trip, business trip, solo getaway) and close by saying which travellers {hotel} suits best.",
            required: "the trip purpose in the introduction and a 'recommended for' line",
            expected_gain: 4.0,
        },
        Pattern::Scene => PatternSpec {
            heading: "Scene description",
            instruction: "Describe concrete scenes as you lived them: stepping into the room, the view from the window, walking to the bath.",
            required: "at least 3 scene descriptions placed in a specific moment",
            expected_gain: 4.0,
        },
        Pattern::FirstPerson => PatternSpec {
            heading: "First-person experience",
            instruction: "Write as a guest who actually stayed. Use 'I' or 'we' throughout and report what you did, not what the hotel advertises.",
            required: "first-person narration in at least 3 paragraphs",
            expected_gain: 5.0,
        },
        Pattern::ObjectiveData => PatternSpec {
            heading: "Objective data",
            instruction: "Back claims with numbers: room size in square meters, walking minutes from the station, floor count, nightly rates.",
            required: "at least 5 concrete figures with units",
            expected_gain: 6.0,
        },
        Pattern::FiveSenses => PatternSpec {
            heading: "Five senses",
            instruction: "Describe the stay through all five senses: the view, the quiet or the sounds, the scent of the bath, the taste of the food, the feel of the bedding.",
            required: "each of sight, sound, smell, taste and touch at least once",
            expected_gain: 6.0,
        },
        Pattern::Cuisine => PatternSpec {
            heading: "Cuisine",
            instruction: "Describe breakfast and dinner dish by dish: ingredients, presentation and what stood out.",
            required: "at least 3 named dishes across breakfast and dinner",
            expected_gain: 5.0,
        },
        Pattern::Facility => PatternSpec {
            heading: "Facilities",
            instruction: "Cover the facilities of {hotel} (baths or onsen, pool, sauna, lounge, parking) and mention {hotel} by name in the introduction, a heading and the conclusion.",
            required: "at least 4 facilities and the hotel name at least 3 times",
            expected_gain: 6.0,
        },
        Pattern::Faq => PatternSpec {
            heading: "FAQ",
            instruction: "End with an FAQ section. Put each question on its own line starting with 'Q:' followed by a short answer.",
            required: "at least 3 Q&A pairs",
            expected_gain: 4.0,
        },
        Pattern::Cta => PatternSpec {
            heading: "Call to action",
            instruction: "Close with a clear booking call to action for {hotel} that points readers to check availability.",
            required: "at least 2 booking prompts",
            expected_gain: 3.0,
        },
        Pattern::ProsCons => PatternSpec {
            heading: "Pros and cons",
            instruction: "Include an honest pros and cons section, with at least one real downside.",
            required: "a pros list and a cons list",
            expected_gain: 3.0,
        },
    }
}

const PREDICTED_IMPROVEMENT_CAP: f64 = 60.0;

pub const TARGET_SCORE: f64 = 80.0;

/// Patterns applied by [`PromptOptimizer::optimize_for_80`].
pub const CORE_PATTERNS: [Pattern; 6] = [
    Pattern::FirstPerson,
    Pattern::Timeline,
    Pattern::Emotion,
    Pattern::FiveSenses,
    Pattern::ObjectiveData,
    Pattern::Faq,
];

fn render_block(prompt: &str, hotel_name: &str, patterns: &[Pattern], boost: BoostLevel) -> String {
    let hotel = match hotel_name.trim() {
        "" => "the hotel",
        name => name,
    };

    let mut out = String::with_capacity(prompt.len() + patterns.len() * 256);
    out.push_str(prompt);
    out.push_str("\n\n## Quality reinforcement\n");
    out.push_str(match boost {
        BoostLevel::Normal => "Pay particular attention to the following points.\n",
        BoostLevel::Strong => "The previous draft was weak on the following points. Each one is mandatory.\n",
        BoostLevel::Maximum => "The previous drafts repeatedly failed on the following points. Do not submit the article until every one is satisfied.\n",
    });

    for (i, pattern) in patterns.iter().enumerate() {
        let block = spec(*pattern);
        out.push_str(&format!(
            "\n### {}. {}\n{}\n",
            i + 1,
            block.heading,
            block.instruction.replace("{hotel}", hotel)
        ));
        if boost >= BoostLevel::Strong {
            out.push_str(&format!("Required: {}.\n", block.required));
        }
    }

    if boost == BoostLevel::Maximum {
        out.push_str("\n## Final checklist\n");
        for pattern in patterns {
            let block = spec(*pattern);
            out.push_str(&format!("- [ ] {}: {}\n", block.heading, block.required));
        }
    }
    out
}

fn predict(patterns: &[Pattern], boost: BoostLevel) -> Option<f64> {
    if patterns.is_empty() {
        return None;
    }
    let raw: f64 = patterns.iter().map(|p| spec(*p).expected_gain).sum::<f64>() * boost.multiplier();
    Some((raw.min(PREDICTED_IMPROVEMENT_CAP) * 10.0).round() / 10.0)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Augments generation prompts with reinforcement instructions. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptimizer;

impl PromptOptimizer {
    pub fn new() -> Self {
        Self
    }

    pub fn optimize(&self, prompt: &str, hotel_name: &str, options: &OptimizeOptions) -> OptimizationResult {
        let patterns = dedup(
            patterns_for(&options.weak_points)
                .into_iter()
                .chain(options.force_patterns.iter().copied()),
        );

        if patterns.is_empty() {
            return OptimizationResult {
                prompt: prompt.to_string(),
                patterns_applied: Vec::new(),
                boost_level: options.boost_level,
                predicted_improvement: None,
            };
        }

        debug!(
            patterns = ?patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            boost = %options.boost_level,
            "Applying reinforcement patterns"
        );

        OptimizationResult {
            prompt: render_block(prompt, hotel_name, &patterns, options.boost_level),
            predicted_improvement: predict(&patterns, options.boost_level),
            patterns_applied: patterns,
            boost_level: options.boost_level,
        }
    }

    /// Optimize toward a total score of 80 without a prior analysis.
    pub fn optimize_for_80(&self, prompt: &str, hotel_name: &str) -> OptimizationResult {
        let options = OptimizeOptions {
            weak_points: Vec::new(),
            boost_level: BoostLevel::Strong,
            force_patterns: CORE_PATTERNS.to_vec(),
        };
        let mut result = self.optimize(prompt, hotel_name, &options);
        result.prompt.push_str(&format!(
            "\nTarget: the finished article must reach an HQC score of {TARGET_SCORE:.0} or higher on Human, Quality and Content.\n"
        ));
        result
    }
}
