//! Named actions the host binds to its UI (export, import, recover, clear).
//!
//! Commands that act on "the current calculator" resolve the active session
//! at call time. Every dialog is an await point: other notifications keep
//! flowing while it is open, so the session is re-resolved by handle after
//! the user answers and a session that closed in the meantime is not an
//! error.

pub mod files;

use serde::Serialize;
use std::sync::Arc;

use crate::content::VariantId;
use crate::error::PanelError;
use crate::recovery::RecoveryEntry;
use crate::state::{PanelManager, SurfaceHandle};
use crate::surface::{Interaction, SaveRequest};

pub const REOPEN_CHOICE: &str = "Reopen";
pub const LATER_CHOICE: &str = "Later";
pub const CLEAR_CHOICE: &str = "Clear";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Completed,
    /// The user dismissed a dialog; nothing happened.
    Abandoned,
    /// No calculator is visible.
    NoActiveSession,
    /// The action could not run on the given input (e.g. invalid file).
    Rejected { reason: String },
}

/// What closing a surface did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CloseOutcome {
    pub recorded: Option<RecoveryEntry>,
    pub reopened: Option<SurfaceHandle>,
}

#[derive(Clone)]
pub struct Commands {
    manager: PanelManager,
    interaction: Arc<dyn Interaction>,
}

impl Commands {
    pub fn new(manager: PanelManager, interaction: Arc<dyn Interaction>) -> Self {
        Self {
            manager,
            interaction,
        }
    }

    pub fn manager(&self) -> &PanelManager {
        &self.manager
    }

    pub async fn open(&self, variant: &VariantId) -> Result<SurfaceHandle, PanelError> {
        self.manager.open(variant).await
    }

    /// Save the active calculator's state to a user-chosen file. A completed
    /// export becomes the session's saved baseline.
    #[tracing::instrument(name = "command.export", skip(self))]
    pub async fn export(&self) -> Result<CommandOutcome, PanelError> {
        let Some(active) = self.manager.active_session().await else {
            return Ok(CommandOutcome::NoActiveSession);
        };
        let surface = self.manager.surface(&active.handle).await?;
        let content = surface.get_state().await.map_err(PanelError::Surface)?;

        let request = SaveRequest::json("Export Work");
        let Some(path) = self.interaction.choose_save_location(&request).await else {
            tracing::debug!(handle = %active.handle, "export dialog dismissed");
            return Ok(CommandOutcome::Abandoned);
        };

        files::write_export(&path, &content).await?;
        self.interaction.info("Work exported");

        match self.manager.save(&active.handle, content).await {
            Ok(_) => {}
            Err(PanelError::UnknownHandle(handle)) => {
                tracing::debug!(handle = %handle, "surface closed before export finished");
            }
            Err(e) => return Err(e),
        }
        Ok(CommandOutcome::Completed)
    }

    /// Load a user-chosen file into the active calculator.
    #[tracing::instrument(name = "command.import", skip(self))]
    pub async fn import(&self) -> Result<CommandOutcome, PanelError> {
        let Some(active) = self.manager.active_session().await else {
            return Ok(CommandOutcome::NoActiveSession);
        };

        let request = SaveRequest::json("Import Work");
        let Some(path) = self.interaction.choose_open_file(&request).await else {
            return Ok(CommandOutcome::Abandoned);
        };

        let content = match files::read_import(&path).await? {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "import file is not JSON");
                self.interaction.error("Invalid JSON file");
                return Ok(CommandOutcome::Rejected {
                    reason: "Invalid JSON file".to_string(),
                });
            }
        };

        match self.manager.import(&active.handle, content).await {
            Ok(()) => {}
            Err(PanelError::UnknownHandle(handle)) => {
                tracing::debug!(handle = %handle, "surface closed before import finished");
                return Ok(CommandOutcome::NoActiveSession);
            }
            Err(e) => return Err(e),
        }
        self.interaction.info("Work imported");
        Ok(CommandOutcome::Completed)
    }

    pub async fn recover_item(&self, entry: &RecoveryEntry) -> Result<SurfaceHandle, PanelError> {
        self.manager.recover(entry).await
    }

    /// Empty the recovery log after confirmation.
    pub async fn clear_recovery(&self) -> Result<CommandOutcome, PanelError> {
        let count = self.manager.recovery().len().await?;
        if count == 0 {
            return Ok(CommandOutcome::Completed);
        }
        let message = format!("Delete {count} recovered item(s)?");
        match self.interaction.confirm(&message, &[CLEAR_CHOICE]).await {
            Some(choice) if choice == CLEAR_CHOICE => {
                self.manager.clear_recovery().await?;
                Ok(CommandOutcome::Completed)
            }
            _ => Ok(CommandOutcome::Abandoned),
        }
    }

    /// The surface went away. Disposal always completes; when unsaved work
    /// was kept the user may reopen it right away in a fresh surface.
    #[tracing::instrument(name = "command.close", skip(self))]
    pub async fn close(&self, handle: &SurfaceHandle) -> Result<CloseOutcome, PanelError> {
        let recorded = self.manager.dispose(handle).await?;
        let mut outcome = CloseOutcome {
            recorded,
            reopened: None,
        };

        let Some(entry) = outcome.recorded.as_ref() else {
            return Ok(outcome);
        };
        if !self.manager.panel_config().confirm_on_close {
            return Ok(outcome);
        }

        let answer = self
            .interaction
            .confirm(
                "This calculator had unsaved work. Reopen it?",
                &[REOPEN_CHOICE, LATER_CHOICE],
            )
            .await;
        if answer.as_deref() == Some(REOPEN_CHOICE) {
            match self.manager.recover(entry).await {
                Ok(handle) => outcome.reopened = Some(handle),
                // Recovered from somewhere else while the prompt was open.
                Err(PanelError::EntryNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }
}
