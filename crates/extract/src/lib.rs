pub mod llm;
pub mod prompt;
pub mod record;
pub mod sanitize;
pub mod schema;
pub mod workflow;

pub use llm::{ChatClient, ChatMessage, ChatModel, Role};
pub use record::AnalysisRecord;
pub use schema::{AnalysisResult, EntitySet, Section, SectionSet};
pub use workflow::{Progress, Stage, Workflow, WorkflowOutput};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Runs the three prompt/response stages against a chat model.
///
/// Each stage sends one user message and recovers a typed value from the
/// reply; a malformed reply degrades to the stage's fallback, while transport
/// errors are returned to the caller.
#[derive(Clone)]
pub struct Extractor {
    model: Arc<dyn ChatModel>,
}

impl Extractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    async fn ask(&self, stage: &str, prompt: String) -> Result<String> {
        let raw = self
            .model
            .complete(&[ChatMessage::user(prompt)])
            .await
            .with_context(|| format!("{} request failed", stage))?;
        debug!(stage, raw = %raw, "Raw model output");
        Ok(raw)
    }

    /// Split the document into titled sections.
    pub async fn extract_sections(&self, text: &str) -> Result<SectionSet> {
        let raw = self
            .ask("sections", prompt::build_sections_prompt(text))
            .await?;
        let sections = sanitize::parse_or_fallback("sections", &raw, || {
            SectionSet::full_document(text)
        });
        debug!(?sections, "Sections parsed");
        Ok(sections)
    }

    /// Tag people, organizations and locations.
    pub async fn extract_entities(&self, text: &str) -> Result<EntitySet> {
        let raw = self
            .ask("entities", prompt::build_entities_prompt(text))
            .await?;
        let entities = sanitize::parse_or_fallback("entities", &raw, EntitySet::default);
        debug!(?entities, "Entities parsed");
        Ok(entities)
    }

    /// Summarize and rate sentiment from the earlier stage outputs.
    pub async fn analyze(
        &self,
        sections: &[Section],
        entities: &EntitySet,
    ) -> Result<AnalysisResult> {
        let raw = self
            .ask("analysis", prompt::build_analysis_prompt(sections, entities))
            .await?;
        let result = sanitize::parse_or_fallback("analysis", &raw, AnalysisResult::failed);
        debug!(?result, "Analysis parsed");
        Ok(result)
    }
}

/// Scripted stand-in for a chat model, shared by the crate's tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        /// Replies in order, failing like a dropped connection at `fail_at`.
        pub fn failing_at(replies: &[&str], fail_at: usize) -> Arc<Self> {
            let mut script: VecDeque<_> = replies.iter().map(|r| Ok(r.to_string())).collect();
            script.insert(fail_at, Err("connection refused".to_string()));
            Arc::new(Self {
                replies: Mutex::new(script),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, Role::User);
            self.prompts.lock().unwrap().push(messages[0].content.clone());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(e)) => Err(anyhow::anyhow!(e)),
                None => Err(anyhow::anyhow!("script exhausted")),
            }
        }

        fn model_id(&self) -> &str {
            "scripted-model"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::ScriptedModel;

    #[tokio::test]
    async fn test_extract_sections_fenced_reply() {
        let model = ScriptedModel::new(&[
            "```json\n{\"sections\":[{\"title\":\"Intro\",\"content\":\"Hello world\"}]}\n```",
        ]);
        let extractor = Extractor::new(model.clone());

        let sections = extractor.extract_sections("Hello world").await.unwrap();

        assert_eq!(
            serde_json::to_value(&sections).unwrap(),
            serde_json::json!({"sections":[{"title":"Intro","content":"Hello world"}]})
        );
        assert!(model.prompt(0).ends_with("Hello world"));
    }

    #[tokio::test]
    async fn test_extract_sections_fallback_holds_entire_text() {
        let text = "x".repeat(prompt::SECTION_TEXT_BUDGET * 2);
        let extractor = Extractor::new(ScriptedModel::new(&["I could not do that."]));

        let sections = extractor.extract_sections(&text).await.unwrap();

        assert_eq!(sections, SectionSet::full_document(&text));
        assert_eq!(sections.sections[0].content.len(), text.len());
    }

    #[tokio::test]
    async fn test_extract_entities_fallback() {
        let extractor = Extractor::new(ScriptedModel::new(&["people: Ada"]));
        let entities = extractor.extract_entities("Ada went to Paris").await.unwrap();
        assert_eq!(entities, EntitySet::default());
    }

    #[tokio::test]
    async fn test_extract_entities_parsed() {
        let extractor = Extractor::new(ScriptedModel::new(&[
            r#"{"people":["Ada"],"organizations":["ACME"],"locations":["Paris","Rome"]}"#,
        ]));
        let entities = extractor.extract_entities("...").await.unwrap();
        assert_eq!(entities.total(), 4);
        assert_eq!(entities.locations, vec!["Paris", "Rome"]);
    }

    #[tokio::test]
    async fn test_analyze_fallback_and_prompt_context() {
        let model = ScriptedModel::new(&["{\"summary\": "]);
        let extractor = Extractor::new(model.clone());
        let sections = vec![Section {
            title: "Intro".into(),
            content: "Hello".into(),
        }];
        let entities = EntitySet {
            organizations: vec!["ACME".into()],
            ..Default::default()
        };

        let result = extractor.analyze(&sections, &entities).await.unwrap();

        assert_eq!(result, AnalysisResult::failed());
        assert!(model.prompt(0).contains("\"title\":\"Intro\""));
        assert!(model.prompt(0).contains("\"organizations\":[\"ACME\"]"));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let extractor = Extractor::new(ScriptedModel::failing_at(&[], 0));
        let err = extractor.extract_entities("text").await.unwrap_err();
        assert!(format!("{err:#}").contains("connection refused"));
    }
}
