use thiserror::Error;

use crate::content::VariantId;
use crate::state::transitions::TransitionError;
use crate::state::types::SurfaceHandle;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("panel error: {0}")]
    Panel(#[from] PanelError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("surface {0} is already registered")]
    DuplicateHandle(SurfaceHandle),
    #[error("surface {0} is not registered")]
    UnknownHandle(SurfaceHandle),
    #[error("recovery entry {index} is corrupt: {source}")]
    CorruptRecoveryEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("recovery entry for variant {variant} is no longer stored")]
    EntryNotFound { variant: VariantId },
    #[error("unknown calculator variant: {0}")]
    UnknownVariant(VariantId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("recovery store error: {0}")]
    Store(#[source] anyhow::Error),
    #[error("surface error: {0}")]
    Surface(#[source] anyhow::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
