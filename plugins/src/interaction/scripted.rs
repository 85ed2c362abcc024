//! Non-interactive dialogs for scripted hosts and batch runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use calcpanel_core::api::{Interaction, SaveRequest};

/// Answers prompts from queued replies, falling back to fixed defaults.
///
/// With nothing queued and no default, a prompt behaves like a dismissed
/// dialog.
#[derive(Default)]
pub struct ScriptedInteraction {
    paths: Mutex<VecDeque<PathBuf>>,
    answers: Mutex<VecDeque<String>>,
    default_answer: Option<String>,
    messages: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every unscripted confirmation with `answer`.
    pub fn with_default_answer(mut self, answer: impl Into<String>) -> Self {
        self.default_answer = Some(answer.into());
        self
    }

    pub fn queue_path(&self, path: PathBuf) {
        lock(&self.paths).push_back(path);
    }

    pub fn queue_answer(&self, answer: impl Into<String>) {
        lock(&self.answers).push_back(answer.into());
    }

    /// Drop replies that no prompt consumed.
    pub fn reset(&self) {
        lock(&self.paths).clear();
        lock(&self.answers).clear();
    }

    /// Info and error messages shown so far, oldest first.
    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.messages))
    }

    fn next_path(&self, request: &SaveRequest) -> Option<PathBuf> {
        let path = lock(&self.paths).pop_front();
        if path.is_none() {
            tracing::debug!(title = %request.title, "no scripted path, dialog dismissed");
        }
        path
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn choose_save_location(&self, request: &SaveRequest) -> Option<PathBuf> {
        self.next_path(request)
    }

    async fn choose_open_file(&self, request: &SaveRequest) -> Option<PathBuf> {
        self.next_path(request)
    }

    async fn confirm(&self, message: &str, choices: &[&str]) -> Option<String> {
        let answer = lock(&self.answers)
            .pop_front()
            .or_else(|| self.default_answer.clone())?;
        if choices.iter().any(|c| *c == answer) {
            tracing::debug!(%message, %answer, "confirmation answered");
            Some(answer)
        } else {
            tracing::debug!(%message, %answer, "answer is not one of the choices, dismissing");
            None
        }
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
        lock(&self.messages).push(message.to_string());
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
        lock(&self.messages).push(message.to_string());
    }
}
