use hqc_engine::analyzer::Priority;
use hqc_engine::weak_points::{detect_weak_axis, WEAK_AXIS_SCORE, WEAK_CATEGORY_RATIO};
use hqc_engine::{analyze, AnalysisContext, Analyzer, Axis, AxisWeights, Category, WeightPreset};

const FULL_ARTICLE: &str = "\
## Arriving at Hotel Sakura

We arrived for check-in at 3 pm on our anniversary getaway. When we opened the door, \
we stepped into a 32 sqm room and loved the view from the window. The room was quiet \
and the sheets felt soft.

## Dinner and the onsen

That evening we were delighted by the dinner menu, full of savory flavor. The onsen, \
the pool, the sauna and the lounge left us relaxed. A faint scent of cedar filled the hall.

## The next morning

The next morning the breakfast buffet impressed me. The station is 5 minutes away on foot, \
the hotel has 12 floors and 180 rooms, and the airport is 8 km away. Check-out was smooth.

## Pros and cons of Hotel Sakura

Pros: the bath. Cons: the rates are high, at $250 per night.

Q: Is parking available?
Q: Is breakfast included?
Q: Can guests arrive early?

Book now or check availability for Hotel Sakura.
";

const NO_HUMAN_SIGNALS: &str = "\
Hotel Sakura has 180 rooms on 12 floors.

The onsen and the pool are open daily.

Breakfast is served as a buffet.
";

#[test]
fn article_without_human_signals_scores_zero_on_h() {
    let result = analyze(NO_HUMAN_SIGNALS, "Hotel Sakura");
    assert_eq!(result.h_score, 0.0);

    let weak_h: Vec<Category> = result
        .weak_points
        .iter()
        .filter(|wp| wp.axis == Axis::H)
        .map(|wp| wp.category)
        .collect();
    assert_eq!(weak_h, Category::for_axis(Axis::H).to_vec());

    let high: Vec<&str> = result
        .recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .filter_map(|r| r.param.as_deref())
        .collect();
    for id in ["timeline", "emotion", "purpose", "scene", "first_person"] {
        assert!(high.contains(&id), "missing high-priority {id}: {high:?}");
    }
}

#[test]
fn saturated_article_scores_full_marks() {
    let result = analyze(FULL_ARTICLE, "Hotel Sakura");
    for detail in result
        .h_details
        .iter()
        .chain(&result.q_details)
        .chain(&result.c_details)
    {
        assert!(
            detail.observed >= detail.target,
            "{} observed {} of {}",
            detail.category,
            detail.observed,
            detail.target
        );
    }
    assert_eq!(result.h_score, 100.0);
    assert_eq!(result.q_score, 100.0);
    assert_eq!(result.c_score, 100.0);
    assert_eq!(result.total_score, 100.0);
    assert!(result.weak_points.is_empty(), "{:?}", result.weak_points);
    assert!(result.recommendations.is_empty());
}

#[test]
fn keyphrase_needs_a_hotel_name() {
    let result = analyze(FULL_ARTICLE, "");
    let keyphrase = result.detail(Category::Keyphrase).unwrap();
    assert_eq!(keyphrase.observed, 0);
    assert!(result.weak_points.iter().any(|wp| wp.category == Category::Keyphrase));
}

#[test]
fn scores_stay_within_bounds() {
    let inputs = [
        "",
        "   \n\n  ",
        NO_HUMAN_SIGNALS,
        FULL_ARTICLE,
        "<p>&nbsp;</p><h2></h2>",
        "私は朝食のビュッフェに感動しました。",
    ];
    for input in inputs {
        let result = analyze(input, "Hotel Sakura");
        for score in [result.total_score, result.h_score, result.q_score, result.c_score] {
            assert!((0.0..=100.0).contains(&score), "score {score} for {input:?}");
        }
        for d in result.h_details.iter().chain(&result.q_details).chain(&result.c_details) {
            assert!(d.score >= 0.0 && d.score <= d.max, "{d:?}");
        }
    }
}

#[test]
fn weak_points_match_the_half_ratio_exactly() {
    let text = "We loved breakfast.\n\nThe pool was quiet.\n\n## Rooms\n\nRates start at $120.";
    let result = analyze(text, "Hotel Sakura");
    for axis in Axis::ALL {
        for d in result.details(axis) {
            let weak = d.score / d.max < WEAK_CATEGORY_RATIO;
            let listed = result.weak_points.iter().any(|wp| wp.category == d.category);
            assert_eq!(weak, listed, "{} ratio {}", d.category, d.score / d.max);
        }
    }
}

#[test]
fn weak_axes_are_those_under_fifty() {
    let result = analyze(NO_HUMAN_SIGNALS, "Hotel Sakura");
    let weak = detect_weak_axis(&result);
    assert!(weak.contains(&Axis::H));
    for axis in Axis::ALL {
        assert_eq!(weak.contains(&axis), result.axis_score(axis) < WEAK_AXIS_SCORE);
    }
    assert!(detect_weak_axis(&analyze(FULL_ARTICLE, "Hotel Sakura")).is_empty());
}

#[test]
fn html_markup_is_stripped_before_matching() {
    let html = "<h2>Rooms</h2><p>We loved it.</p><h3>Food</h3><p>I was happy.</p>";
    let result = analyze(html, "");
    assert_eq!(result.detail(Category::Headings).unwrap().observed, 2);
    assert_eq!(result.detail(Category::FirstPerson).unwrap().observed, 2);
    assert_eq!(result.detail(Category::Emotion).unwrap().observed, 2);
    assert_eq!(
        result.char_count,
        "Rooms\n\nWe loved it.\n\nFood\n\nI was happy.".chars().count()
    );
}

#[test]
fn weights_change_total_but_not_axes() {
    let balanced = analyze(NO_HUMAN_SIGNALS, "Hotel Sakura");
    let seo = Analyzer::new(WeightPreset::SeoFocus.weights())
        .analyze(NO_HUMAN_SIGNALS, &AnalysisContext::for_hotel("Hotel Sakura"));
    assert_eq!(balanced.h_score, seo.h_score);
    assert_eq!(balanced.c_score, seo.c_score);
    assert_eq!(seo.weights, AxisWeights { h: 25.0, q: 30.0, c: 45.0 });

    let zero = Analyzer::new(AxisWeights { h: 0.0, q: 0.0, c: 0.0 })
        .analyze(FULL_ARTICLE, &AnalysisContext::for_hotel("Hotel Sakura"));
    assert_eq!(zero.total_score, 0.0);
}

#[test]
fn json_output_uses_stable_identifiers() {
    let result = analyze(NO_HUMAN_SIGNALS, "Hotel Sakura");
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["h_details"][0]["category"], "timeline");
    assert_eq!(value["h_details"][4]["basis"], "paragraph_count");
    assert_eq!(value["q_details"][1]["basis"], "found");
    assert_eq!(value["weak_points"][0]["axis"], "H");
    assert_eq!(value["recommendations"][0]["priority"], "high");
    assert_eq!(value["weights"]["q"], 34.0);
}
