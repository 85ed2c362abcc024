//! Headless host: applies [`HostMessage`]s to the panel manager and reports
//! what happened.

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};

use calcpanel_core::api::{
    Commands, PanelError, PanelEvent, PanelManager, RecoveryStore, SurfaceHandle, VariantId,
};
use calcpanel_core::config::PanelConfig;
use calcpanel_plugins::interaction::ScriptedInteraction;
use calcpanel_plugins::surface::{HeadlessLauncher, SurfaceNotification};

use super::protocol::{HostMessage, HostOutput};

pub struct Host {
    commands: Commands,
    launcher: Arc<HeadlessLauncher>,
    dialogs: Arc<ScriptedInteraction>,
    notifications: mpsc::UnboundedReceiver<SurfaceNotification>,
    events: broadcast::Receiver<PanelEvent>,
    names: HashMap<String, SurfaceHandle>,
}

impl Host {
    pub fn new(
        panel: PanelConfig,
        recovery: Arc<RecoveryStore>,
        default_answer: Option<String>,
    ) -> Self {
        let (launcher, notifications) = HeadlessLauncher::new();
        let launcher = Arc::new(launcher);
        let dialogs = match default_answer {
            Some(answer) => ScriptedInteraction::new().with_default_answer(answer),
            None => ScriptedInteraction::new(),
        };
        let dialogs = Arc::new(dialogs);

        let manager = PanelManager::new(recovery, launcher.clone(), panel);
        let events = manager.subscribe();
        let commands = Commands::new(manager, dialogs.clone());

        Self {
            commands,
            launcher,
            dialogs,
            notifications,
            events,
            names: HashMap::new(),
        }
    }

    pub fn manager(&self) -> &PanelManager {
        self.commands.manager()
    }

    fn resolve(&self, handle: &str) -> SurfaceHandle {
        self.names
            .get(handle)
            .cloned()
            .unwrap_or_else(|| SurfaceHandle::from(handle))
    }

    fn remember(&mut self, name: Option<String>, handle: &SurfaceHandle) {
        if let Some(name) = name {
            self.names.insert(name, handle.clone());
        }
    }

    /// Parse and apply one input line.
    pub async fn handle_line(&mut self, line: &str) -> Vec<HostOutput> {
        let mut out = Vec::new();
        match serde_json::from_str::<HostMessage>(line) {
            Ok(msg) => {
                let op = msg.op().to_string();
                match self.apply(msg).await {
                    Ok(result) => out.push(HostOutput::Reply { op, result }),
                    Err(e) => {
                        tracing::debug!(op = %op, error = %e, "host message failed");
                        out.push(HostOutput::Error {
                            op,
                            message: format!("{e:#}"),
                        });
                    }
                }
            }
            Err(e) => out.push(HostOutput::Error {
                op: "parse".to_string(),
                message: e.to_string(),
            }),
        }
        self.dialogs.reset();
        self.pump().await;
        out.extend(self.drain_events());
        out
    }

    async fn apply(&mut self, msg: HostMessage) -> Result<serde_json::Value> {
        let manager = self.commands.manager().clone();
        match msg {
            HostMessage::Open { variant, name } => {
                let handle = self.commands.open(&VariantId::new(variant)).await?;
                self.remember(name, &handle);
                let title = self.launcher.surface(&handle).map(|s| s.title().to_string());
                Ok(json!({ "handle": handle, "title": title }))
            }
            HostMessage::Edit { handle, content } => {
                let handle = self.resolve(&handle);
                let surface = self
                    .launcher
                    .surface(&handle)
                    .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
                surface.edit(content);
                self.pump().await;
                Ok(serde_json::to_value(manager.session(&handle).await?)?)
            }
            HostMessage::Change { handle, content } => {
                let state = manager.change(&self.resolve(&handle), content).await?;
                Ok(json!({ "state": state }))
            }
            HostMessage::Show { handle } => {
                manager.set_visible(&self.resolve(&handle), true).await?;
                self.active().await
            }
            HostMessage::Hide { handle } => {
                manager.set_visible(&self.resolve(&handle), false).await?;
                self.active().await
            }
            HostMessage::Focus { handle } => {
                manager.focus(&self.resolve(&handle)).await?;
                self.active().await
            }
            HostMessage::Export { path } => {
                if let Some(path) = path {
                    self.dialogs.queue_path(path);
                }
                Ok(serde_json::to_value(self.commands.export().await?)?)
            }
            HostMessage::Import { path } => {
                if let Some(path) = path {
                    self.dialogs.queue_path(path);
                }
                Ok(serde_json::to_value(self.commands.import().await?)?)
            }
            HostMessage::Close { handle, answer } => {
                if let Some(answer) = answer {
                    self.dialogs.queue_answer(answer);
                }
                let handle = self.resolve(&handle);
                let outcome = self.commands.close(&handle).await?;
                self.launcher.forget(&handle);
                self.names.retain(|_, h| h != &handle);
                Ok(serde_json::to_value(outcome)?)
            }
            HostMessage::Recover {
                index,
                variant,
                name,
            } => {
                let variant = variant.map(VariantId::new);
                let entries = manager.list_recovery(variant.as_ref()).await?;
                let entry = entries
                    .get(index)
                    .ok_or_else(|| anyhow!("no recovery entry at index {index}"))?;
                let handle = self.commands.recover_item(entry).await?;
                self.remember(name, &handle);
                Ok(json!({ "handle": handle }))
            }
            HostMessage::List { variant } => {
                let variant = variant.map(VariantId::new);
                let entries = manager.list_recovery(variant.as_ref()).await?;
                let listed: Vec<_> = entries
                    .iter()
                    .enumerate()
                    .map(|(index, e)| {
                        json!({
                            "index": index,
                            "label": e.label(),
                            "variant": e.variant,
                            "timestamp": e.timestamp,
                        })
                    })
                    .collect();
                Ok(json!({ "entries": listed }))
            }
            HostMessage::Clear { answer } => {
                if let Some(answer) = answer {
                    self.dialogs.queue_answer(answer);
                }
                Ok(serde_json::to_value(self.commands.clear_recovery().await?)?)
            }
            HostMessage::Status => {
                let sessions = manager.sessions().await;
                let active = manager.active_session().await.map(|s| s.handle);
                Ok(json!({ "sessions": sessions, "active": active }))
            }
        }
    }

    async fn active(&self) -> Result<serde_json::Value> {
        let active = self.manager().active_session().await.map(|s| s.handle);
        Ok(json!({ "active": active }))
    }

    /// Forward queued surface notifications to the manager.
    async fn pump(&mut self) {
        while let Ok(n) = self.notifications.try_recv() {
            match self.commands.manager().change(&n.handle, n.content).await {
                Ok(_) => {}
                Err(PanelError::UnknownHandle(handle)) => {
                    tracing::debug!(handle = %handle, "notification for a closed surface");
                }
                Err(e) => tracing::warn!(error = %e, "failed to apply surface notification"),
            }
        }
    }

    fn drain_events(&mut self) -> Vec<HostOutput> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => out.push(HostOutput::Event(event)),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "event stream lagged");
                }
                Err(_) => break,
            }
        }
        out
    }

    /// Host shutdown: every open surface is disposed.
    pub async fn shutdown(&mut self) -> Result<Vec<HostOutput>> {
        self.pump().await;
        let recorded = self.manager().dispose_all().await?;
        if !recorded.is_empty() {
            tracing::info!(count = recorded.len(), "unsaved work kept at shutdown");
        }
        Ok(self.drain_events())
    }
}

/// Feed every line of `reader` through `host`, writing JSON lines to
/// `writer`. Returns the number of messages processed.
pub async fn run<R, W>(host: &mut Host, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut processed = 0;
    while let Some(line) = lines.next_line().await.context("failed to read host input")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        processed += 1;
        let outputs = host.handle_line(line).await;
        write_outputs(&mut writer, &outputs).await?;
    }
    let outputs = host.shutdown().await?;
    write_outputs(&mut writer, &outputs).await?;
    writer.flush().await?;
    Ok(processed)
}

async fn write_outputs<W: AsyncWrite + Unpin>(writer: &mut W, outputs: &[HostOutput]) -> Result<()> {
    for output in outputs {
        let mut line = serde_json::to_string(output)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
    }
    Ok(())
}
