//! crates/trip_scout_core/src/parse.rs
//!
//! Turns semi-structured model output into typed items.

use crate::domain::{ScoutCategory, ScoutItem};
use tracing::warn;

fn preview(line: &str) -> String {
    line.chars().take(120).collect()
}

fn decode(category: ScoutCategory, raw: &str, scout_name: &str) -> Option<ScoutItem> {
    match ScoutItem::from_model_json(category, raw) {
        Ok(item) if item.name().trim().is_empty() => {
            warn!("{}: skipping item with no name: {:?}", scout_name, preview(raw));
            None
        }
        Ok(item) => Some(item),
        Err(e) => {
            warn!(
                "{}: failed to parse JSON line ({}): {:?}",
                scout_name,
                e,
                preview(raw)
            );
            None
        }
    }
}

/// Parses newline-delimited JSON. Only lines starting with `{` are candidates;
/// a bad line is logged and skipped, never fatal.
pub fn parse_json_lines(category: ScoutCategory, text: &str, scout_name: &str) -> Vec<ScoutItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| decode(category, line, scout_name))
        .collect()
}

/// Removes a surrounding ```` ``` ```` / ```` ```json ```` fence if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let inner = rest.split("```").next().unwrap_or_default();
            inner.strip_prefix("json").unwrap_or(inner).trim()
        }
        None => trimmed,
    }
}

/// Parses a single-item answer: one line, or one pretty-printed object, possibly fenced.
/// Returns every candidate in order so the caller can skip excluded ones.
pub fn parse_candidates(category: ScoutCategory, text: &str, scout_name: &str) -> Vec<ScoutItem> {
    let body = strip_code_fence(text);
    let items = parse_json_lines(category, body, scout_name);
    if !items.is_empty() {
        return items;
    }
    decode(category, body, scout_name).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_prose_and_malformed_lines() {
        let text = r#"Here are your spots:
{"day": 1, "name": "Miradouro de Santa Luzia"}
{"day": 1, "name": "broken"
  {"day": 2, "name": "Cais do Sodré"}
{"day": 2}
"#;
        let items = parse_json_lines(ScoutCategory::Photos, text, "Photo Scout");
        let names: Vec<&str> = items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Miradouro de Santa Luzia", "Cais do Sodré"]);
    }

    #[test]
    fn all_garbage_yields_empty() {
        let items = parse_json_lines(ScoutCategory::Restaurants, "sorry, I can't", "Restaurant Scout");
        assert!(items.is_empty());
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn candidates_accept_pretty_printed_objects() {
        let text = "```json\n{\n  \"day\": 2,\n  \"name\": \"Tasca da Esquina\",\n  \"meal_type\": \"dinner\"\n}\n```";
        let items = parse_candidates(ScoutCategory::Restaurants, text, "Replace Scout");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "Tasca da Esquina");
        assert_eq!(items[0].day(), 2);
    }
}
