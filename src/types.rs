use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::optimizer::{BoostLevel, Pattern};

// ---------------------------------------------------------------------------
// Axes and categories
// ---------------------------------------------------------------------------

/// One of the three HQC rubric axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Human: experiential authenticity.
    H,
    /// Quality: informational specificity.
    Q,
    /// Content: structural and SEO completeness.
    C,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::H, Axis::Q, Axis::C];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::H => "H",
            Axis::Q => "Q",
            Axis::C => "C",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" => Ok(Axis::H),
            "Q" => Ok(Axis::Q),
            "C" => Ok(Axis::C),
            other => Err(format!("unknown axis '{other}'")),
        }
    }
}

/// Scored sub-category. Each variant belongs to exactly one axis; the variant
/// order inside an axis is the order details and weak points are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // H
    Timeline,
    Emotion,
    Purpose,
    Scene,
    FirstPerson,
    // Q
    ObjectiveData,
    FiveSenses,
    Cuisine,
    Facility,
    // C
    Headings,
    Keyphrase,
    Faq,
    Cta,
    ProsCons,
    Price,
}

const H_CATEGORIES: [Category; 5] = [
    Category::Timeline,
    Category::Emotion,
    Category::Purpose,
    Category::Scene,
    Category::FirstPerson,
];

const Q_CATEGORIES: [Category; 4] = [
    Category::ObjectiveData,
    Category::FiveSenses,
    Category::Cuisine,
    Category::Facility,
];

const C_CATEGORIES: [Category; 6] = [
    Category::Headings,
    Category::Keyphrase,
    Category::Faq,
    Category::Cta,
    Category::ProsCons,
    Category::Price,
];

impl Category {
    pub fn for_axis(axis: Axis) -> &'static [Category] {
        match axis {
            Axis::H => &H_CATEGORIES,
            Axis::Q => &Q_CATEGORIES,
            Axis::C => &C_CATEGORIES,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Category::Timeline
            | Category::Emotion
            | Category::Purpose
            | Category::Scene
            | Category::FirstPerson => Axis::H,
            Category::ObjectiveData
            | Category::FiveSenses
            | Category::Cuisine
            | Category::Facility => Axis::Q,
            Category::Headings
            | Category::Keyphrase
            | Category::Faq
            | Category::Cta
            | Category::ProsCons
            | Category::Price => Axis::C,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Timeline => "timeline",
            Category::Emotion => "emotion",
            Category::Purpose => "purpose",
            Category::Scene => "scene",
            Category::FirstPerson => "first_person",
            Category::ObjectiveData => "objective_data",
            Category::FiveSenses => "five_senses",
            Category::Cuisine => "cuisine",
            Category::Facility => "facility",
            Category::Headings => "headings",
            Category::Keyphrase => "keyphrase",
            Category::Faq => "faq",
            Category::Cta => "cta",
            Category::ProsCons => "pros_cons",
            Category::Price => "price",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Axis::ALL
            .iter()
            .flat_map(|axis| Category::for_axis(*axis).iter().copied())
            .find(|c| c.as_str() == name)
            .ok_or_else(|| format!("unknown category '{name}'"))
    }
}

// ---------------------------------------------------------------------------
// Weak points
// ---------------------------------------------------------------------------

/// An `{axis, category}` pair whose sub-score fell under half of its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeakPoint {
    pub axis: Axis,
    pub category: Category,
}

impl WeakPoint {
    pub fn new(category: Category) -> Self {
        Self {
            axis: category.axis(),
            category,
        }
    }
}

impl fmt::Display for WeakPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.axis, self.category)
    }
}

impl FromStr for WeakPoint {
    type Err = String;

    /// Parses `"H:emotion"`. The axis must own the category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (axis, category) = s
            .split_once(':')
            .ok_or_else(|| format!("expected AXIS:category, got '{s}'"))?;
        let axis: Axis = axis.parse()?;
        let category: Category = category.parse()?;
        if category.axis() != axis {
            return Err(format!(
                "category '{category}' belongs to axis {}, not {axis}",
                category.axis()
            ));
        }
        Ok(Self { axis, category })
    }
}

// ---------------------------------------------------------------------------
// Hotel data
// ---------------------------------------------------------------------------

/// Source data for one hotel, as returned by the data collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelData {
    pub hotel_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// OTA name to booking URL.
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
    /// Pre-generation source-data heuristic on 0..=1. `None` means unscored.
    #[serde(default)]
    pub hqc_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Generation options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStyle {
    #[default]
    Story,
    Review,
    Guide,
}

impl ArticleStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStyle::Story => "story",
            ArticleStyle::Review => "review",
            ArticleStyle::Guide => "guide",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDepth {
    Light,
    #[default]
    Standard,
    Deep,
}

impl ContentDepth {
    /// Target article length in characters.
    pub fn target_chars(self) -> usize {
        match self {
            ContentDepth::Light => 2000,
            ContentDepth::Standard => 4000,
            ContentDepth::Deep => 6000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Pending,
    Publish,
}

/// Per-request generation options. Passed by value through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub style: ArticleStyle,
    pub persona: String,
    pub tone: String,
    pub depth: ContentDepth,
    pub content_elements: Vec<String>,
    /// Weak points from a previous analysis; non-empty on the regeneration path.
    pub weak_points: Vec<WeakPoint>,
    pub force_patterns: Vec<Pattern>,
    pub boost_level: BoostLevel,
    /// Overrides `Settings::default_model` when set.
    pub ai_model: Option<String>,
    pub post_status: Option<PostStatus>,
    pub skip_hqc_check: bool,
    pub allow_duplicate: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            style: ArticleStyle::default(),
            persona: "general".to_string(),
            tone: "casual".to_string(),
            depth: ContentDepth::default(),
            content_elements: Vec::new(),
            weak_points: Vec::new(),
            force_patterns: Vec::new(),
            boost_level: BoostLevel::default(),
            ai_model: None,
            post_status: None,
            skip_hqc_check: false,
            allow_duplicate: false,
        }
    }
}

impl GenerationOptions {
    pub fn is_regeneration(&self) -> bool {
        !self.weak_points.is_empty() || !self.force_patterns.is_empty()
    }
}
