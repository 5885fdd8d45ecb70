//! Instruction template rendering.
//!
//! The analysis prompt is a Tera template; the only variables are the
//! optional trip centroid coordinates.

use tera::{Context, Tera};

use crate::error::{Error, Result};
use crate::types::LocationHint;

/// Fixed instruction sent ahead of the trip photos.
pub const TRAVEL_ANALYSIS_TEMPLATE: &str = r#"You are an expert in analyzing travel photos. Analyze all of the provided travel images together and answer in JSON.
{% if location %}The approximate center of this trip is at latitude {{ location.latitude }}, longitude {{ location.longitude }}.{% else %}The center of this trip is unknown; infer it from the photos if you can.{% endif %}

1. **overall_mood**: Summarize the overall mood of this trip's photos in one sentence.
2. **top5_subjects**: List the 5 subjects (people, animals, specific buildings, natural features, ...) that appear most often, in order of frequency, with an approximate count for each.
3. **photo_category_ratio**: Give the approximate share of people, landscape, food and other photos as percentages (e.g. "people: 30%, landscape: 50%, food: 10%, other: 10%"). Use 0% for categories that are missing.
4. **top_visit_place**: For the trip center coordinates, name the place that appears most often. Echo the coordinates you were given.
5. **recommended_places**: Recommend five places near the most visited place that this traveller would likely enjoy, each with a short reason.
6. **mbti**: Based on the overall mood and content of the trip, infer the traveller's MBTI type (e.g. "ISFJ", "ENTP").
7. **emotion**: If people appear in the photos, describe the dominant emotional tone of the people; otherwise use null.

Respond with JSON in exactly this shape:
{
  "travel_analysis": {
    "overall_mood": "The overall mood of this trip is ...",
    "top5_subjects": [
      {"subject": "subject1", "count": 10},
      {"subject": "subject2", "count": 8},
      {"subject": "subject3", "count": 5},
      {"subject": "subject4", "count": 3},
      {"subject": "subject5", "count": 2}
    ],
    "photo_category_ratio": {
      "people": "30%",
      "landscape": "50%",
      "food": "10%",
      "other": "10%"
    },
    "top_visit_place": {
      "latitude": {% if location %}{{ location.latitude }}{% else %}null{% endif %},
      "longitude": {% if location %}{{ location.longitude }}{% else %}null{% endif %},
      "place_name": "Haeundae, Busan"
    },
    "recommended_places": [
      {"place_name": "place1", "reason": "..."},
      {"place_name": "place2", "reason": "..."},
      {"place_name": "place3", "reason": "..."},
      {"place_name": "place4", "reason": "..."},
      {"place_name": "place5", "reason": "..."}
    ],
    "mbti": "ISFJ",
    "emotion": "joyful"
  }
}
"#;

/// Render the analysis instruction for an optional trip centroid.
pub fn render_instruction(location: Option<&LocationHint>) -> Result<String> {
    render(TRAVEL_ANALYSIS_TEMPLATE, location)
}

fn render(template: &str, location: Option<&LocationHint>) -> Result<String> {
    let mut context = Context::new();
    if let Some(location) = location {
        context.insert("location", location);
    }

    Tera::one_off(template, &context, false).map_err(|e| Error::Template(e.to_string()))
}
