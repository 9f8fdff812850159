use hqc_engine::optimizer::{pattern_for, patterns_for, CORE_PATTERNS};
use hqc_engine::{analyze, Axis, BoostLevel, Category, OptimizeOptions, Pattern, PromptOptimizer, WeakPoint};

const BASE_PROMPT: &str = "Write a hotel review article about Hotel Sakura.";

fn weak(spec: &str) -> WeakPoint {
    spec.parse().unwrap()
}

#[test]
fn emotion_weak_point_injects_reinforcement() {
    let options = OptimizeOptions {
        weak_points: vec![weak("H:emotion")],
        ..OptimizeOptions::default()
    };
    let result = PromptOptimizer::new().optimize(BASE_PROMPT, "Hotel Sakura", &options);

    assert!(result.patterns_applied.contains(&Pattern::Emotion));
    assert!(result.prompt.len() > BASE_PROMPT.len());
    assert!(result.prompt.starts_with(BASE_PROMPT));
    assert!(result.prompt.contains("## Quality reinforcement"));
    assert!(result.predicted_improvement.is_some_and(|p| p > 0.0));
}

#[test]
fn optimization_is_deterministic() {
    let options = OptimizeOptions {
        weak_points: vec![weak("H:emotion"), weak("C:faq"), weak("Q:five_senses")],
        boost_level: BoostLevel::Strong,
        force_patterns: vec![Pattern::Cta],
    };
    let optimizer = PromptOptimizer::new();
    let first = optimizer.optimize(BASE_PROMPT, "Hotel Sakura", &options);
    let second = optimizer.optimize(BASE_PROMPT, "Hotel Sakura", &options);
    assert_eq!(first, second);
}

#[test]
fn every_weak_point_of_an_analysis_has_a_pattern() {
    let result = analyze("A short note with nothing in it.", "Hotel Sakura");
    assert!(!result.weak_points.is_empty());

    let patterns = patterns_for(&result.weak_points);
    for wp in &result.weak_points {
        let pattern = pattern_for(*wp);
        assert!(patterns.contains(&pattern));
        assert_eq!(pattern.as_str().parse::<Pattern>().unwrap(), pattern);
    }
}

#[test]
fn weak_point_labels_round_trip() {
    for axis in Axis::ALL {
        for category in Category::for_axis(axis) {
            let wp = WeakPoint::new(*category);
            assert_eq!(wp.axis, axis);
            assert_eq!(wp.to_string().parse::<WeakPoint>().unwrap(), wp);
        }
    }
    assert!("Q:emotion".parse::<WeakPoint>().is_err());
    assert!("X:emotion".parse::<WeakPoint>().is_err());
}

#[test]
fn nothing_to_apply_returns_prompt_unchanged() {
    let result = PromptOptimizer::new().optimize(BASE_PROMPT, "Hotel Sakura", &OptimizeOptions::default());
    assert_eq!(result.prompt, BASE_PROMPT);
    assert!(result.patterns_applied.is_empty());
    assert_eq!(result.predicted_improvement, None);
}

#[test]
fn forced_patterns_follow_weak_point_patterns_without_duplicates() {
    let options = OptimizeOptions {
        weak_points: vec![weak("C:headings"), weak("H:emotion")],
        boost_level: BoostLevel::Normal,
        force_patterns: vec![Pattern::Emotion, Pattern::ProsCons],
    };
    let result = PromptOptimizer::new().optimize(BASE_PROMPT, "Hotel Sakura", &options);
    assert_eq!(
        result.patterns_applied,
        vec![Pattern::Timeline, Pattern::Emotion, Pattern::ProsCons]
    );
}

#[test]
fn boost_levels_escalate_the_block() {
    let optimizer = PromptOptimizer::new();
    let run = |boost_level| {
        optimizer.optimize(
            BASE_PROMPT,
            "Hotel Sakura",
            &OptimizeOptions {
                weak_points: vec![weak("Q:cuisine")],
                boost_level,
                force_patterns: Vec::new(),
            },
        )
    };
    let normal = run(BoostLevel::Normal);
    let strong = run(BoostLevel::Strong);
    let maximum = run(BoostLevel::Maximum);

    assert!(!normal.prompt.contains("Required:"));
    assert!(strong.prompt.contains("Required:"));
    assert!(maximum.prompt.contains("## Final checklist"));
    assert!(normal.prompt.len() < strong.prompt.len());
    assert!(strong.prompt.len() < maximum.prompt.len());
    assert!(normal.predicted_improvement < maximum.predicted_improvement);
}

#[test]
fn predicted_improvement_is_capped() {
    let options = OptimizeOptions {
        weak_points: Vec::new(),
        boost_level: BoostLevel::Maximum,
        force_patterns: vec![
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
        ],
    };
    let result = PromptOptimizer::new().optimize(BASE_PROMPT, "", &options);
    assert_eq!(result.predicted_improvement, Some(60.0));
    assert!(!result.prompt.contains("{hotel}"));
}

#[test]
fn optimize_for_80_applies_the_core_set() {
    let result = PromptOptimizer::new().optimize_for_80(BASE_PROMPT, "Hotel Sakura");
    assert_eq!(result.patterns_applied, CORE_PATTERNS.to_vec());
    assert_eq!(result.boost_level, BoostLevel::Strong);
    assert!(result.prompt.contains("HQC score of 80"));
}
