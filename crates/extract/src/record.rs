use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{AnalysisResult, EntitySet, SectionSet};
use crate::workflow::WorkflowOutput;

/// Persisted outcome of one document run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub filename: String,
    /// UTC, RFC 3339 with microseconds.
    pub timestamp: String,
    pub model: String,
    pub result: AnalysisResult,
    pub entities: EntitySet,
    pub sections: SectionSet,
}

impl AnalysisRecord {
    pub fn new(filename: &str, model: &str, output: WorkflowOutput) -> Self {
        Self {
            filename: base_name(filename).to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            model: model.to_string(),
            result: output.result,
            entities: output.entities,
            sections: output.sections,
        }
    }

    /// `analysis_<filename>.json`
    pub fn file_name(&self) -> String {
        report_file_name(&self.filename)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize analysis record")
    }

    /// Write the record into `dir`, returning the file path.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_json()?)
            .await
            .with_context(|| format!("Failed to write analysis record {:?}", path))?;

        Ok(path)
    }
}

/// Report file name for an uploaded document.
pub fn report_file_name(filename: &str) -> String {
    format!("analysis_{}.json", base_name(filename))
}

fn base_name(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}
