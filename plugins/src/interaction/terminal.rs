//! Prompts on the controlling terminal.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use calcpanel_core::api::{Interaction, SaveRequest};

/// Writes prompts to stderr and reads one line of stdin per answer. An
/// empty line or end of input dismisses the prompt.
#[derive(Default)]
pub struct TerminalInteraction;

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }

    async fn ask(&self, prompt: &str) -> Option<String> {
        let mut stderr = tokio::io::stderr();
        if stderr.write_all(prompt.as_bytes()).await.is_err() {
            return None;
        }
        let _ = stderr.flush().await;

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
        }
    }

    async fn ask_path(&self, request: &SaveRequest) -> Option<PathBuf> {
        let prompt = format!("{} (.{}): ", request.title, request.extensions.join(", ."));
        self.ask(&prompt).await.map(PathBuf::from)
    }
}

#[async_trait]
impl Interaction for TerminalInteraction {
    async fn choose_save_location(&self, request: &SaveRequest) -> Option<PathBuf> {
        self.ask_path(request).await
    }

    async fn choose_open_file(&self, request: &SaveRequest) -> Option<PathBuf> {
        self.ask_path(request).await
    }

    async fn confirm(&self, message: &str, choices: &[&str]) -> Option<String> {
        let prompt = format!("{message} [{}]: ", choices.join("/"));
        let answer = self.ask(&prompt).await?;
        choices
            .iter()
            .find(|c| c.eq_ignore_ascii_case(&answer))
            .map(|c| c.to_string())
    }

    fn info(&self, message: &str) {
        eprintln!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}
