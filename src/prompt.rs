use std::fmt::Write;

use crate::collaborators::PromptEngine;
use crate::types::{ArticleStyle, GenerationOptions, HotelData};

/// Default prompt engine: one review-article prompt assembled from the hotel
/// data and the request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePromptEngine;

fn style_instruction(style: ArticleStyle) -> &'static str {
    match style {
        ArticleStyle::Story => "Write it as a personal stay story that follows one visit from arrival to departure.",
        ArticleStyle::Review => "Write it as a structured review that weighs rooms, food, baths and service.",
        ArticleStyle::Guide => "Write it as a practical guide for travellers deciding whether to book.",
    }
}

impl PromptEngine for TemplatePromptEngine {
    fn build_prompt(&self, hotel: &HotelData, options: &GenerationOptions) -> String {
        let mut p = String::new();
        // write! into a String cannot fail
        let _ = writeln!(p, "Write a hotel review article about {}.", hotel.hotel_name);
        if !hotel.address.trim().is_empty() {
            let _ = writeln!(p, "Address: {}", hotel.address.trim());
        }
        let _ = writeln!(
            p,
            "Persona: {}. Tone: {}. {}",
            options.persona,
            options.tone,
            style_instruction(options.style)
        );
        let _ = writeln!(
            p,
            "Length: about {} characters. Use HTML with <h2> and <h3> section headings.",
            options.depth.target_chars()
        );

        if !hotel.features.is_empty() {
            p.push_str("\nKnown features:\n");
            for feature in &hotel.features {
                let _ = writeln!(p, "- {feature}");
            }
        }

        if !options.content_elements.is_empty() {
            p.push_str("\nThe article must include:\n");
            for element in &options.content_elements {
                let _ = writeln!(p, "- {element}");
            }
        }

        if !hotel.urls.is_empty() {
            p.push_str("\nBooking links for the call to action:\n");
            for (ota, url) in &hotel.urls {
                let _ = writeln!(p, "- {ota}: {url}");
            }
        }

        p.push_str("\nDo not invent facts that contradict the data above. Do not leave placeholders.\n");
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentDepth;

    #[test]
    fn prompt_carries_hotel_data_and_options() {
        let hotel = HotelData {
            hotel_name: "Hotel Sakura".into(),
            address: "Kyoto".into(),
            features: vec!["open-air bath".into()],
            urls: [("rakuten".to_string(), "https://travel.example/1".to_string())]
                .into_iter()
                .collect(),
            hqc_score: Some(0.8),
        };
        let options = GenerationOptions {
            depth: ContentDepth::Deep,
            style: ArticleStyle::Guide,
            content_elements: vec!["access from Kyoto station".into()],
            ..GenerationOptions::default()
        };
        let prompt = TemplatePromptEngine.build_prompt(&hotel, &options);
        assert!(prompt.starts_with("Write a hotel review article about Hotel Sakura."));
        assert!(prompt.contains("Address: Kyoto"));
        assert!(prompt.contains("about 6000 characters"));
        assert!(prompt.contains("- open-air bath"));
        assert!(prompt.contains("- access from Kyoto station"));
        assert!(prompt.contains("- rakuten: https://travel.example/1"));
        assert!(prompt.contains("practical guide"));
    }

    #[test]
    fn optional_sections_are_omitted() {
        let hotel = HotelData {
            hotel_name: "Inn".into(),
            ..HotelData::default()
        };
        let prompt = TemplatePromptEngine.build_prompt(&hotel, &GenerationOptions::default());
        assert!(!prompt.contains("Address:"));
        assert!(!prompt.contains("Known features"));
        assert!(!prompt.contains("Booking links"));
    }
}
