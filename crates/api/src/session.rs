//! One document run as seen by a user: progress, result, downloadable report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use extract::{AnalysisRecord, ChatClient, Progress, Workflow};
use ingest::FileReader;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;

pub const UPLOAD_PROMPT: &str = "Upload a .pdf or .docx file.";

/// Long-lived handles shared by every request.
pub struct AppContext {
    pub workflow: Workflow,
    pub output_dir: PathBuf,
}

impl AppContext {
    pub fn new(workflow: Workflow, output_dir: PathBuf) -> Self {
        Self {
            workflow,
            output_dir,
        }
    }

    /// Connect to the configured model endpoint, resolving the model alias.
    pub async fn from_config(config: &AppConfig) -> Self {
        let client = ChatClient::new(
            config.model.base_url.clone(),
            config.model.model.clone(),
            config.model.api_key.clone(),
        )
        .resolve_model()
        .await;

        info!(
            base_url = client.base_url(),
            model = extract::ChatModel::model_id(&client),
            "Model endpoint ready"
        );

        Self::new(
            Workflow::new(Arc::new(client)),
            config.server.output_dir.clone(),
        )
    }
}

/// A downloadable attachment on a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileElement {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiMessage {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<FileElement>,
}

impl UiMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            elements: Vec::new(),
        }
    }
}

impl From<Progress> for UiMessage {
    fn from(progress: Progress) -> Self {
        Self::text(progress.to_string())
    }
}

/// Markdown summary with the report attached.
pub fn final_message(record: &AnalysisRecord) -> UiMessage {
    let file_name = record.file_name();
    UiMessage {
        content: format!(
            "# Summary\n{}\n\n### Sentiment: {}",
            record.result.summary, record.result.sentiment
        ),
        elements: vec![FileElement {
            url: format!("/reports/{}", file_name),
            name: file_name,
        }],
    }
}

pub struct DocumentRun {
    pub record: AnalysisRecord,
    pub report_path: PathBuf,
}

/// Extract, analyze and persist one uploaded document, emitting each message
/// as it becomes available.
///
/// Nothing is written unless every stage completed.
pub async fn analyze_document<F>(
    ctx: &AppContext,
    file_name: &str,
    bytes: Vec<u8>,
    mut emit: F,
) -> Result<DocumentRun>
where
    F: FnMut(UiMessage) + Send,
{
    emit(Progress::ExtractingText.into());
    let text = FileReader::read_bytes(file_name, bytes).await?;
    emit(Progress::TextExtracted {
        characters: text.chars().count(),
    }
    .into());

    let output = ctx
        .workflow
        .run_with_progress(&text, |progress| emit(progress.into()))
        .await?;

    let record = AnalysisRecord::new(file_name, ctx.workflow.model_id(), output);
    let report_path = record.save(&ctx.output_dir).await?;
    info!(path = ?report_path, "Analysis record saved");

    emit(final_message(&record));

    Ok(DocumentRun {
        record,
        report_path,
    })
}

/// Batch counterpart of [`analyze_document`] for a file on disk.
///
/// Progress goes to the log only; the record is returned and not persisted.
pub async fn analyze_path(workflow: &Workflow, path: &Path) -> Result<AnalysisRecord> {
    info!("{}", Progress::ExtractingText);
    let text = ingest::load_text(path).await?;
    info!(
        "{}",
        Progress::TextExtracted {
            characters: text.chars().count()
        }
    );

    let output = workflow.run(&text).await?;
    let file_name = path.to_string_lossy();

    Ok(AnalysisRecord::new(&file_name, workflow.model_id(), output))
}
