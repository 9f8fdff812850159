//! Score history across generated articles.
//!
//! Categories that keep coming out weak are fed back to the optimizer as
//! forced patterns, so even first-time generations get the reinforcement.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;
use crate::optimizer::{patterns_for, Pattern};
use crate::types::{Axis, Category, WeakPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub hotel_name: String,
    pub total_score: f64,
    pub h_score: f64,
    pub q_score: f64,
    pub c_score: f64,
    pub weak_points: Vec<WeakPoint>,
}

/// The last `window` snapshots across all hotels, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningModule {
    window: usize,
    snapshots: VecDeque<ScoreSnapshot>,
}

impl LearningModule {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            snapshots: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn record(&mut self, hotel_name: &str, result: &AnalysisResult) {
        if self.snapshots.len() == self.window {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(ScoreSnapshot {
            hotel_name: hotel_name.to_string(),
            total_score: result.total_score,
            h_score: result.h_score,
            q_score: result.q_score,
            c_score: result.c_score,
            weak_points: result.weak_points.clone(),
        });
    }

    /// Retained snapshots for one hotel, oldest first.
    pub fn history(&self, hotel_name: &str) -> Vec<&ScoreSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.hotel_name == hotel_name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Categories weak in at least half of the most recent snapshots, in
    /// classifier order.
    pub fn chronic_weak_points(&self) -> Vec<WeakPoint> {
        let recent = &self.snapshots;
        if recent.is_empty() {
            return Vec::new();
        }
        Axis::ALL
            .iter()
            .flat_map(|axis| Category::for_axis(*axis).iter().copied())
            .filter(|category| {
                let hits = recent
                    .iter()
                    .filter(|s| s.weak_points.iter().any(|wp| wp.category == *category))
                    .count();
                hits * 2 >= recent.len()
            })
            .map(WeakPoint::new)
            .collect()
    }

    pub fn suggested_patterns(&self) -> Vec<Pattern> {
        patterns_for(&self.chronic_weak_points())
    }

    pub fn average_total(&self) -> Option<f64> {
        let recent = &self.snapshots;
        if recent.is_empty() {
            return None;
        }
        Some(recent.iter().map(|s| s.total_score).sum::<f64>() / recent.len() as f64)
    }
}
