//! Fixed three-stage analysis chain: sections, then entities, then analysis.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm::ChatModel;
use crate::schema::{AnalysisResult, EntitySet, SectionSet};
use crate::Extractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sections,
    Entities,
    Analysis,
}

impl Stage {
    /// The only execution order.
    pub const ORDER: [Stage; 3] = [Stage::Sections, Stage::Entities, Stage::Analysis];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Sections => "sections",
            Stage::Entities => "entities",
            Stage::Analysis => "analysis",
        }
    }
}

/// User-facing milestones of a document run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    ExtractingText,
    TextExtracted { characters: usize },
    SectionsExtracted { count: usize },
    EntitiesFound { count: usize },
    AnalysisComplete,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::ExtractingText => write!(f, "📄 Extracting text..."),
            Progress::TextExtracted { characters } => {
                write!(f, "✅ Text extracted ({} characters)", characters)
            }
            Progress::SectionsExtracted { count } => write!(f, "✅ {} sections extracted", count),
            Progress::EntitiesFound { count } => write!(f, "✅ {} entities found", count),
            Progress::AnalysisComplete => write!(f, "✅ Analysis complete"),
        }
    }
}

/// Outputs of all three stages, exactly as each stage produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutput {
    pub sections: SectionSet,
    pub entities: EntitySet,
    pub result: AnalysisResult,
}

/// Values accumulated while walking the stages.
struct WorkflowState<'a> {
    text: &'a str,
    sections: Option<SectionSet>,
    entities: Option<EntitySet>,
    result: Option<AnalysisResult>,
}

impl<'a> WorkflowState<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            sections: None,
            entities: None,
            result: None,
        }
    }

    fn finish(self) -> Result<WorkflowOutput> {
        Ok(WorkflowOutput {
            sections: self.sections.context("sections stage did not run")?,
            entities: self.entities.context("entities stage did not run")?,
            result: self.result.context("analysis stage did not run")?,
        })
    }
}

#[derive(Clone)]
pub struct Workflow {
    extractor: Extractor,
}

impl Workflow {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            extractor: Extractor::new(model),
        }
    }

    pub fn model_id(&self) -> &str {
        self.extractor.model_id()
    }

    pub async fn run(&self, text: &str) -> Result<WorkflowOutput> {
        self.run_with_progress(text, |_| {}).await
    }

    /// Run every stage in [`Stage::ORDER`], reporting after each one.
    ///
    /// The first model transport error aborts the run.
    pub async fn run_with_progress<F>(&self, text: &str, mut on_progress: F) -> Result<WorkflowOutput>
    where
        F: FnMut(Progress) + Send,
    {
        let mut state = WorkflowState::new(text);

        for stage in Stage::ORDER {
            let progress = self
                .run_stage(stage, &mut state)
                .await
                .with_context(|| format!("{} stage failed", stage.name()))?;
            info!(stage = stage.name(), "{}", progress);
            on_progress(progress);
        }

        state.finish()
    }

    async fn run_stage(&self, stage: Stage, state: &mut WorkflowState<'_>) -> Result<Progress> {
        match stage {
            Stage::Sections => {
                let sections = self.extractor.extract_sections(state.text).await?;
                let count = sections.len();
                state.sections = Some(sections);
                Ok(Progress::SectionsExtracted { count })
            }
            Stage::Entities => {
                let entities = self.extractor.extract_entities(state.text).await?;
                let count = entities.total();
                state.entities = Some(entities);
                Ok(Progress::EntitiesFound { count })
            }
            Stage::Analysis => {
                let sections = state
                    .sections
                    .as_ref()
                    .context("analysis needs section output")?;
                let entities = state
                    .entities
                    .as_ref()
                    .context("analysis needs entity output")?;
                let result = self
                    .extractor
                    .analyze(&sections.sections, entities)
                    .await?;
                state.result = Some(result);
                Ok(Progress::AnalysisComplete)
            }
        }
    }
}
