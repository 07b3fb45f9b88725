use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Stage 1 output: the document split into titled sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSet {
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl SectionSet {
    /// Fallback when the model reply is unusable: the whole text as one section.
    pub fn full_document(text: &str) -> Self {
        Self {
            sections: vec![Section {
                title: "Full Document".to_string(),
                content: text.to_string(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Stage 2 output. Every key is always present, empty by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl EntitySet {
    pub fn total(&self) -> usize {
        self.people.len() + self.organizations.len() + self.locations.len()
    }
}

fn neutral() -> String {
    "neutral".to_string()
}

/// Stage 3 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default = "neutral")]
    pub sentiment: String,
}

impl AnalysisResult {
    pub fn failed() -> Self {
        Self {
            summary: "Failed".to_string(),
            sentiment: neutral(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_default() {
        let entities: EntitySet = serde_json::from_value(json!({"people": ["Ada"]})).unwrap();
        assert_eq!(entities.people, vec!["Ada"]);
        assert!(entities.organizations.is_empty());
        assert!(entities.locations.is_empty());

        let sections: SectionSet = serde_json::from_value(json!({})).unwrap();
        assert!(sections.is_empty());

        let result: AnalysisResult = serde_json::from_value(json!({"summary": "ok"})).unwrap();
        assert_eq!(result.sentiment, "neutral");
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(EntitySet::default()).unwrap();
        assert_eq!(value, json!({"people": [], "organizations": [], "locations": []}));

        let value = serde_json::to_value(SectionSet::full_document("all of it")).unwrap();
        assert_eq!(
            value,
            json!({"sections": [{"title": "Full Document", "content": "all of it"}]})
        );
    }

    #[test]
    fn test_entity_total() {
        let entities = EntitySet {
            people: vec!["Ada".into(), "Grace".into()],
            organizations: vec!["ACME".into()],
            locations: vec![],
        };
        assert_eq!(entities.total(), 3);
    }
}
