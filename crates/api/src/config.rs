use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub server: ServerConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// OpenAI-compatible base URL, including the `/v1` prefix.
    pub base_url: String,
    /// Model alias; resolved against the runtime's model list at startup.
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    /// Where analysis records are written.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                base_url: "http://localhost:5273/v1".to_string(),
                model: "phi-4".to_string(),
                api_key: None,
            },
            server: ServerConfig {
                bind: "0.0.0.0:3000".to_string(),
                output_dir: PathBuf::from("."),
            },
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `DOCSIGHT_*` variables (a `.env` file is honored).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DOCSIGHT_BASE_URL") {
            config.model.base_url = url;
        }
        if let Some(model) = get("DOCSIGHT_MODEL") {
            config.model.model = model;
        }
        config.model.api_key = get("DOCSIGHT_API_KEY");
        if let Some(bind) = get("DOCSIGHT_BIND") {
            config.server.bind = bind;
        }
        if let Some(dir) = get("DOCSIGHT_OUTPUT_DIR") {
            config.server.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = get("DOCSIGHT_LOG_FORMAT") {
            config.log_format = if format.eq_ignore_ascii_case("json") {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            };
        }

        config
    }
}
