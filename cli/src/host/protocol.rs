//! JSON-lines protocol between a scripted host and the panel manager.
//!
//! One [`HostMessage`] per input line; every line produces a reply or an
//! error line, followed by the panel events it caused.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use calcpanel_core::api::{Content, PanelEvent};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostMessage {
    /// Open a calculator. `name` lets later messages refer to it.
    Open {
        variant: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// The user edits the calculator (the surface reports the change).
    Edit { handle: String, content: Content },
    /// Raw change notification, bypassing the surface.
    Change { handle: String, content: Content },
    Show { handle: String },
    Hide { handle: String },
    Focus { handle: String },
    /// Export the active calculator; `path` answers the save dialog.
    Export {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Import into the active calculator; `path` answers the open dialog.
    Import {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// The surface was closed; `answer` replies to the reopen prompt.
    Close {
        handle: String,
        #[serde(default)]
        answer: Option<String>,
    },
    /// Reopen the `index`-th entry of the (optionally filtered) recovery list.
    Recover {
        index: usize,
        #[serde(default)]
        variant: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    List {
        #[serde(default)]
        variant: Option<String>,
    },
    Clear {
        #[serde(default)]
        answer: Option<String>,
    },
    /// Report every open session.
    Status,
}

impl HostMessage {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Edit { .. } => "edit",
            Self::Change { .. } => "change",
            Self::Show { .. } => "show",
            Self::Hide { .. } => "hide",
            Self::Focus { .. } => "focus",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::Close { .. } => "close",
            Self::Recover { .. } => "recover",
            Self::List { .. } => "list",
            Self::Clear { .. } => "clear",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostOutput {
    Reply {
        op: String,
        result: serde_json::Value,
    },
    Error {
        op: String,
        message: String,
    },
    Event(PanelEvent),
}
