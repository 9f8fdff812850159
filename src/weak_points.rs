//! Weak-point classification over analyzer details.
//!
//! A category is weak when its score is under half of its maximum; an axis is
//! weak when its score is under 50. Weak points come out H, then Q, then C,
//! each in the axis' category order, which is what UIs truncate against.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::analyzer::{AnalysisResult, CategoryDetail};
use crate::types::{Axis, WeakPoint};

pub const WEAK_CATEGORY_RATIO: f64 = 0.5;
pub const WEAK_AXIS_SCORE: f64 = 50.0;

/// `score / max`, or 0 when `max` is not positive.
pub fn ratio(detail: &CategoryDetail) -> f64 {
    if detail.max > 0.0 {
        detail.score / detail.max
    } else {
        0.0
    }
}

/// A zero-max category is never weak.
pub fn is_weak(detail: &CategoryDetail) -> bool {
    detail.max > 0.0 && ratio(detail) < WEAK_CATEGORY_RATIO
}

pub fn extract_weak_points(result: &AnalysisResult) -> Vec<WeakPoint> {
    Axis::ALL
        .iter()
        .flat_map(|axis| result.details(*axis).iter())
        .filter(|d| is_weak(d))
        .map(|d| WeakPoint::new(d.category))
        .collect()
}

pub fn detect_weak_axis(result: &AnalysisResult) -> BTreeSet<Axis> {
    Axis::ALL
        .iter()
        .copied()
        .filter(|axis| result.axis_score(*axis) < WEAK_AXIS_SCORE)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakPointSummary {
    pub shown: Vec<String>,
    pub remaining: usize,
}

/// First `shown` weak points as labels plus how many were left out.
pub fn summarize(weak_points: &[WeakPoint], shown: usize) -> WeakPointSummary {
    WeakPointSummary {
        shown: weak_points.iter().take(shown).map(|wp| wp.to_string()).collect(),
        remaining: weak_points.len().saturating_sub(shown),
    }
}
