use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{AxisWeights, Settings};
use crate::optimizer::pattern_for;
use crate::types::{Axis, Category, WeakPoint};
use crate::weak_points::{extract_weak_points, ratio, WEAK_CATEGORY_RATIO};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// What `observed` counts for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Paragraphs containing the signal.
    ParagraphCount,
    /// Distinct signal families present.
    Found,
    /// Raw signal occurrences.
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub score: f64,
    pub max: f64,
    pub observed: usize,
    pub target: usize,
    pub basis: Basis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_score: f64,
    pub h_score: f64,
    pub q_score: f64,
    pub c_score: f64,
    pub h_details: Vec<CategoryDetail>,
    pub q_details: Vec<CategoryDetail>,
    pub c_details: Vec<CategoryDetail>,
    pub weak_points: Vec<WeakPoint>,
    pub recommendations: Vec<Recommendation>,
    pub weights: AxisWeights,
    pub char_count: usize,
}

impl AnalysisResult {
    pub fn axis_score(&self, axis: Axis) -> f64 {
        match axis {
            Axis::H => self.h_score,
            Axis::Q => self.q_score,
            Axis::C => self.c_score,
        }
    }

    pub fn details(&self, axis: Axis) -> &[CategoryDetail] {
        match axis {
            Axis::H => &self.h_details,
            Axis::Q => &self.q_details,
            Axis::C => &self.c_details,
        }
    }

    pub fn detail(&self, category: Category) -> Option<&CategoryDetail> {
        self.details(category.axis())
            .iter()
            .find(|d| d.category == category)
    }
}

/// Hints the analyzer matches against besides the text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisContext {
    pub hotel_name: String,
}

impl AnalysisContext {
    pub fn for_hotel(hotel_name: impl Into<String>) -> Self {
        Self {
            hotel_name: hotel_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct CategorySpec {
    category: Category,
    max: f64,
    target: usize,
    basis: Basis,
}

struct Hyperparameters {
    categories: [CategorySpec; 15],
    low_priority_ratio: f64,
    score_min: f64,
    score_max: f64,
}

static HP: Hyperparameters = Hyperparameters {
    categories: [
        // H: 5 x 20
        CategorySpec { category: Category::Timeline, max: 20.0, target: 3, basis: Basis::Count },
        CategorySpec { category: Category::Emotion, max: 20.0, target: 4, basis: Basis::Count },
        CategorySpec { category: Category::Purpose, max: 20.0, target: 2, basis: Basis::Count },
        CategorySpec { category: Category::Scene, max: 20.0, target: 3, basis: Basis::Count },
        CategorySpec { category: Category::FirstPerson, max: 20.0, target: 3, basis: Basis::ParagraphCount },
        // Q: 4 x 25
        CategorySpec { category: Category::ObjectiveData, max: 25.0, target: 5, basis: Basis::Count },
        CategorySpec { category: Category::FiveSenses, max: 25.0, target: 5, basis: Basis::Found },
        CategorySpec { category: Category::Cuisine, max: 25.0, target: 3, basis: Basis::Count },
        CategorySpec { category: Category::Facility, max: 25.0, target: 4, basis: Basis::Count },
        // C: 2 x 20 + 4 x 15
        CategorySpec { category: Category::Headings, max: 20.0, target: 4, basis: Basis::Count },
        CategorySpec { category: Category::Keyphrase, max: 20.0, target: 3, basis: Basis::Count },
        CategorySpec { category: Category::Faq, max: 15.0, target: 3, basis: Basis::Count },
        CategorySpec { category: Category::Cta, max: 15.0, target: 2, basis: Basis::Count },
        CategorySpec { category: Category::ProsCons, max: 15.0, target: 2, basis: Basis::Count },
        CategorySpec { category: Category::Price, max: 15.0, target: 2, basis: Basis::Count },
    ],
    low_priority_ratio: 0.8,
    score_min: 0.0,
    score_max: 100.0,
};

fn spec_for(category: Category) -> Option<&'static CategorySpec> {
    HP.categories.iter().find(|s| s.category == category)
}

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static BLOCK_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:p|div|li|h[1-6]|blockquote|section|table|tr|dl|dd)\s*>|<br\s*/?>").unwrap()
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\u{3000}]*\n").unwrap());

static TIMELINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(チェックイン|チェックアウト|到着|翌朝|朝食後|夕方|夜|\d{1,2}時",
        r"|\bcheck-?in\b|\bcheck-?out\b|\barrived\b|\bin the morning\b|\bthat evening\b",
        r"|\bat night\b|\bthe next morning\b|\bat \d{1,2}(?::\d{2})?\s?(?:am|pm)\b)",
    ))
    .unwrap()
});

static EMOTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(感動|嬉し|うれし|驚|癒さ|幸せ|感激|楽しかった",
        r"|\bdelighted\b|\bloved\b|\bthrilled\b|\bmoved\b|\bhappy\b|\bsurprised\b",
        r"|\bimpressed\b|\brelaxed\b|\bexcited\b)",
    ))
    .unwrap()
});

static PURPOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(記念日|誕生日|出張|家族旅行|一人旅|カップル|女子旅|ハネムーン",
        r"|\banniversary\b|\bbirthday\b|\bbusiness trip\b|\bfamily trip\b|\bsolo trip\b",
        r"|\bhoneymoon\b|\bgetaway\b)",
    ))
    .unwrap()
});

static SCENE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(窓から|目の前|見渡|部屋に入|扉を開け",
        r"|\bfrom the window\b|\bstepped into\b|\bas (?:we|i) walked\b|\bopened the door\b",
        r"|\bin front of (?:us|me)\b|\blooking out\b)",
    ))
    .unwrap()
});

static FIRST_PERSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(私|僕|わたし|我々|\bI\b|\bwe\b|\bmy\b|\bour\b|\bme\b|\bus\b)").unwrap());

static OBJECTIVE_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\d[\d,.]*\s?(?:㎡|平米|m²|sqm|square meters|円|yen|分|minutes?|mins?\b",
        r"|km\b|階|floors?\b|室|rooms\b|%)",
    ))
    .unwrap()
});

static SENSE_FAMILIES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // sight
        Regex::new(r"(?i)(眺め|景色|見え|夜景|\bviews?\b|\bglow\w*|\bsparkl\w*|\bcolou?rs?\b)").unwrap(),
        // sound
        Regex::new(r"(?i)(音|静か|聞こえ|\bquiet\b|\bsound\w*|\bheard\b|\bsilence\b)").unwrap(),
        // smell
        Regex::new(r"(?i)(香り|匂い|\bscent\w*|\baroma\w*|\bsmell\w*|\bfragran\w*)").unwrap(),
        // taste
        Regex::new(r"(?i)(味|美味|甘み|\bflavou?r\w*|\btaste\w*|\bsavou?ry\b|\bsweet\w*)").unwrap(),
        // touch
        Regex::new(r"(?i)(肌触り|柔らか|ふかふか|\bsoft\w*|\bsmooth\w*|\bfluffy\b|\btexture\w*)").unwrap(),
    ]
});

static CUISINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(朝食|夕食|料理|ビュッフェ|懐石",
        r"|\bbreakfast\b|\bdinner\b|\bbuffet\b|\bcuisine\b|\bdish(?:es)?\b|\bmenu\b)",
    ))
    .unwrap()
});

static FACILITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(温泉|大浴場|露天風呂|プール|スパ|サウナ|ラウンジ|駐車場|ジム",
        r"|\bonsen\b|\bhot springs?\b|\bpool\b|\bspa\b|\bsauna\b|\blounge\b|\bparking\b",
        r"|\bgym\b|\bfitness\b)",
    ))
    .unwrap()
});

// Counted on the raw markup so HTML headings survive tag stripping.
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)<h[2-4][\s>]|^[ \t]{0,3}#{2,4}[ \t]+\S").unwrap());

static FAQ_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:Q\d*[ \t]*[.:：]|Ｑ\d*[ \t]*[.:：．]?|質問[ \t]*[:：])").unwrap());

static CTA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(予約|空室|今すぐ|詳細はこちら",
        r"|\bbook now\b|\bcheck availability\b|\breserve\b|\bbook (?:your|a) (?:stay|room)\b)",
    ))
    .unwrap()
});

static PROS_CONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(メリット|デメリット|良かった点|気になった点|残念な点",
        r"|\bpros\b|\bcons\b|\bdownsides?\b|\bdrawbacks?\b)",
    ))
    .unwrap()
});

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(\d[\d,]*\s?円|[¥￥]\s?\d|\$\s?\d|料金|宿泊費",
        r"|\bper night\b|\brates?\b|\bprices?\b|\bpriced\b)",
    ))
    .unwrap()
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Plain text and paragraphs extracted once per analysis.
struct Prepared<'a> {
    raw: &'a str,
    plain: String,
    paragraphs: Vec<String>,
}

pub(crate) fn strip_markup(content: &str) -> String {
    let broken = BLOCK_BREAK_RE.replace_all(content, "\n\n");
    let stripped = TAG_RE.replace_all(&broken, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn prepare(content: &str) -> Prepared<'_> {
    let plain = strip_markup(content);
    let paragraphs = PARAGRAPH_SPLIT_RE
        .split(&plain)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    Prepared {
        raw: content,
        plain,
        paragraphs,
    }
}

fn count_keyphrase(text: &str, hotel_name: &str) -> usize {
    let name = hotel_name.trim();
    if name.is_empty() {
        return 0;
    }
    Regex::new(&format!("(?i){}", regex::escape(name)))
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0)
}

fn observe(category: Category, doc: &Prepared<'_>, ctx: &AnalysisContext) -> usize {
    let text = doc.plain.as_str();
    match category {
        Category::Timeline => TIMELINE_RE.find_iter(text).count(),
        Category::Emotion => EMOTION_RE.find_iter(text).count(),
        Category::Purpose => PURPOSE_RE.find_iter(text).count(),
        Category::Scene => SCENE_RE.find_iter(text).count(),
        Category::FirstPerson => doc
            .paragraphs
            .iter()
            .filter(|p| FIRST_PERSON_RE.is_match(p))
            .count(),
        Category::ObjectiveData => OBJECTIVE_DATA_RE.find_iter(text).count(),
        Category::FiveSenses => SENSE_FAMILIES.iter().filter(|re| re.is_match(text)).count(),
        Category::Cuisine => CUISINE_RE.find_iter(text).count(),
        Category::Facility => FACILITY_RE.find_iter(text).count(),
        Category::Headings => HEADING_RE.find_iter(doc.raw).count(),
        Category::Keyphrase => count_keyphrase(text, &ctx.hotel_name),
        Category::Faq => FAQ_RE.find_iter(text).count(),
        Category::Cta => CTA_RE.find_iter(text).count(),
        Category::ProsCons => PROS_CONS_RE.find_iter(text).count(),
        Category::Price => PRICE_RE.find_iter(text).count(),
    }
}

fn score_category(spec: &CategorySpec, observed: usize) -> CategoryDetail {
    let score = if spec.target == 0 || spec.max <= 0.0 {
        0.0
    } else {
        let capped = observed.min(spec.target) as f64;
        (capped / spec.target as f64 * spec.max).clamp(0.0, spec.max)
    };
    CategoryDetail {
        category: spec.category,
        score,
        max: spec.max.max(0.0),
        observed,
        target: spec.target,
        basis: spec.basis,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn axis_total(details: &[CategoryDetail]) -> f64 {
    let sum: f64 = details.iter().map(|d| d.score).sum();
    round1(sum.clamp(HP.score_min, HP.score_max))
}

fn advice_for(category: Category) -> &'static str {
    match category {
        Category::Timeline => "Narrate the stay in time order: arrival, evening, next morning.",
        Category::Emotion => "Say how moments felt, not only what happened.",
        Category::Purpose => "State who the stay suits and why you went (anniversary, family trip, business).",
        Category::Scene => "Describe concrete scenes: what you saw stepping into the room or looking out the window.",
        Category::FirstPerson => "Write more paragraphs from your own first-person experience.",
        Category::ObjectiveData => "Add numbers: room size, walking minutes, floor count, prices.",
        Category::FiveSenses => "Cover sight, sound, smell, taste and touch.",
        Category::Cuisine => "Describe breakfast and dinner dishes specifically.",
        Category::Facility => "Cover facilities such as baths, pool, lounge and parking.",
        Category::Headings => "Break the article into more H2/H3 sections.",
        Category::Keyphrase => "Mention the hotel name in the introduction, headings and conclusion.",
        Category::Faq => "Add an FAQ section with at least three Q&A pairs.",
        Category::Cta => "Close with a clear booking call to action.",
        Category::ProsCons => "Add an honest pros and cons section.",
        Category::Price => "Give price ranges or nightly rates.",
    }
}

fn recommendations_for(details: &[&CategoryDetail]) -> Vec<Recommendation> {
    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();
    for d in details {
        let r = ratio(d);
        let param = Some(pattern_for(WeakPoint::new(d.category)).as_str().to_string());
        let rec = |priority| Recommendation {
            priority,
            message: advice_for(d.category).to_string(),
            param: param.clone(),
        };
        if r < WEAK_CATEGORY_RATIO {
            if d.observed == 0 {
                high.push(rec(Priority::High));
            } else {
                medium.push(rec(Priority::Medium));
            }
        } else if r < HP.low_priority_ratio {
            low.push(rec(Priority::Low));
        }
    }
    high.into_iter().chain(medium).chain(low).collect()
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scores article text on the three HQC axes. Pure: no I/O.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    weights: AxisWeights,
}

impl Analyzer {
    pub fn new(weights: AxisWeights) -> Self {
        Self { weights }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.axis_weights())
    }

    pub fn weights(&self) -> AxisWeights {
        self.weights
    }

    pub fn analyze(&self, content: &str, ctx: &AnalysisContext) -> AnalysisResult {
        let doc = prepare(content);

        let details_for = |axis: Axis| -> Vec<CategoryDetail> {
            Category::for_axis(axis)
                .iter()
                .filter_map(|c| spec_for(*c))
                .map(|spec| score_category(spec, observe(spec.category, &doc, ctx)))
                .collect()
        };
        let h_details = details_for(Axis::H);
        let q_details = details_for(Axis::Q);
        let c_details = details_for(Axis::C);

        let h_score = axis_total(&h_details);
        let q_score = axis_total(&q_details);
        let c_score = axis_total(&c_details);

        let w = self.weights;
        let weight_sum = w.sum();
        let total_score = if weight_sum > 0.0 {
            round1(
                ((h_score * w.h + q_score * w.q + c_score * w.c) / weight_sum)
                    .clamp(HP.score_min, HP.score_max),
            )
        } else {
            0.0
        };

        let all: Vec<&CategoryDetail> = h_details
            .iter()
            .chain(q_details.iter())
            .chain(c_details.iter())
            .collect();
        let recommendations = recommendations_for(&all);

        let mut result = AnalysisResult {
            total_score,
            h_score,
            q_score,
            c_score,
            h_details,
            q_details,
            c_details,
            weak_points: Vec::new(),
            recommendations,
            weights: w,
            char_count: doc.plain.trim().chars().count(),
        };
        result.weak_points = extract_weak_points(&result);
        result
    }
}

/// Analyze with the default (balanced) weights.
pub fn analyze(content: &str, hotel_name: &str) -> AnalysisResult {
    Analyzer::default().analyze(content, &AnalysisContext::for_hotel(hotel_name))
}
