use async_trait::async_trait;
use std::path::PathBuf;

/// Parameters for a save-location prompt.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub title: String,
    /// File extensions offered by the dialog filter, without the dot.
    pub extensions: Vec<String>,
}

impl SaveRequest {
    pub fn json(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            extensions: vec!["json".to_string()],
        }
    }
}

/// User-facing prompts. Every prompt may come back empty when the user
/// dismisses it; callers treat that as "do nothing".
#[async_trait]
pub trait Interaction: Send + Sync {
    async fn choose_save_location(&self, request: &SaveRequest) -> Option<PathBuf>;
    async fn choose_open_file(&self, request: &SaveRequest) -> Option<PathBuf>;
    /// Ask a question with a fixed set of answers; returns the chosen one.
    async fn confirm(&self, message: &str, choices: &[&str]) -> Option<String>;
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}
