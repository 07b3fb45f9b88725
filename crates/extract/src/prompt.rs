use crate::schema::{EntitySet, Section};

/// Characters of document text shown to the section splitter.
pub const SECTION_TEXT_BUDGET: usize = 8000;

/// Characters of document text shown to the entity tagger.
pub const ENTITY_TEXT_BUDGET: usize = 6000;

/// First `budget` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn build_sections_prompt(text: &str) -> String {
    format!(
        "Split text into sections as JSON. Return ONLY valid JSON and nothing else:\n\
{{\"sections\":[{{\"title\":\"\",\"content\":\"\"}}]}}\n\
{}",
        truncate_chars(text, SECTION_TEXT_BUDGET)
    )
}

pub fn build_entities_prompt(text: &str) -> String {
    format!(
        "Extract named entities as JSON. Return ONLY valid JSON and nothing else:\n\
{{\"people\":[], \"organizations\":[], \"locations\":[]}}\n\
{}",
        truncate_chars(text, ENTITY_TEXT_BUDGET)
    )
}

/// Prior stage outputs are embedded in full.
pub fn build_analysis_prompt(sections: &[Section], entities: &EntitySet) -> String {
    let sections_json = serde_json::to_string(sections).unwrap_or_else(|_| "[]".to_string());
    let entities_json = serde_json::to_string(entities).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Summarize and rate sentiment as JSON. Return ONLY valid JSON and nothing else.\n\
{{\"summary\":\"...\",\"sentiment\":\"neutral\"}}\n\
Sections: {}\nEntities: {}",
        sections_json, entities_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_based() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_sections_prompt_budget() {
        let text = "a".repeat(SECTION_TEXT_BUDGET + 500);
        let prompt = build_sections_prompt(&text);
        assert!(prompt.contains("\"sections\""));
        assert!(prompt.contains("Return ONLY valid JSON"));
        assert!(prompt.ends_with(&"a".repeat(SECTION_TEXT_BUDGET)));
        assert!(!prompt.contains(&"a".repeat(SECTION_TEXT_BUDGET + 1)));
    }

    #[test]
    fn test_entities_prompt_budget() {
        let text = "b".repeat(ENTITY_TEXT_BUDGET + 1);
        let prompt = build_entities_prompt(&text);
        assert!(prompt.contains("\"organizations\""));
        assert!(!prompt.contains(&"b".repeat(ENTITY_TEXT_BUDGET + 1)));
        assert!(prompt.contains(&"b".repeat(ENTITY_TEXT_BUDGET)));
    }

    #[test]
    fn test_analysis_prompt_is_untruncated() {
        let long = "c".repeat(20_000);
        let sections = vec![Section {
            title: "Body".into(),
            content: long.clone(),
        }];
        let entities = EntitySet {
            people: vec!["Ada Lovelace".into()],
            ..Default::default()
        };
        let prompt = build_analysis_prompt(&sections, &entities);
        assert!(prompt.contains(&long));
        assert!(prompt.contains("Sections: [{\"title\":\"Body\""));
        assert!(prompt.contains("Entities: {\"people\":[\"Ada Lovelace\"]"));
    }
}
