//! `calcpanel recovery ...` subcommands.
use std::io::Write;
use std::path::Path;

use calcpanel_core::api::{
    CliError, Interaction, PanelError, RecoveryEntry, RecoveryStore, VariantId,
};
use calcpanel_core::commands::{files, CLEAR_CHOICE};
use calcpanel_plugins::interaction::TerminalInteraction;
use serde_json::json;

use crate::commands::cli::{ClearArgs, ListArgs, RecoveryCommand, SaveArgs, ShowArgs};

pub async fn handle(cmd: RecoveryCommand, store: &RecoveryStore) -> Result<i32, CliError> {
    let mut out = std::io::stdout();
    match cmd {
        RecoveryCommand::List(args) => handle_list(args, store, &mut out).await,
        RecoveryCommand::Show(args) => handle_show(args, store, &mut out).await,
        RecoveryCommand::Save(args) => handle_save(args, store, &mut out).await,
        RecoveryCommand::Clear(args) => {
            handle_clear(args, store, &TerminalInteraction::new(), &mut out).await
        }
    }
}

async fn pick(
    store: &RecoveryStore,
    index: usize,
    variant: Option<String>,
) -> Result<RecoveryEntry, CliError> {
    let variant = variant.map(VariantId::new);
    let entries = store.list_entries(variant.as_ref()).await?;
    let count = entries.len();
    entries.into_iter().nth(index).ok_or_else(|| {
        CliError::Command(format!(
            "no recovery entry at index {index} ({count} available)"
        ))
    })
}

pub async fn handle_list(
    args: ListArgs,
    store: &RecoveryStore,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    let variant = args.variant.map(VariantId::new);
    let listing = store.scan(variant.as_ref()).await?;

    if args.json {
        for (index, entry) in listing.entries.iter().enumerate() {
            let line = json!({
                "index": index,
                "label": entry.label(),
                "entry": entry,
            });
            writeln!(out, "{line}")?;
        }
    } else if listing.entries.is_empty() {
        writeln!(out, "No unsaved work.")?;
    } else {
        for (index, entry) in listing.entries.iter().enumerate() {
            writeln!(out, "{index:>3}  {}", entry.label())?;
        }
    }

    if listing.skipped > 0 {
        tracing::warn!(skipped = listing.skipped, "unreadable recovery entries skipped");
    }
    Ok(0)
}

pub async fn handle_show(
    args: ShowArgs,
    store: &RecoveryStore,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    let entry = pick(store, args.index, args.variant).await?;
    let text = entry
        .content
        .to_pretty_json()
        .map_err(|e| CliError::Command(format!("failed to render entry: {e}")))?;
    writeln!(out, "{text}")?;
    Ok(0)
}

pub async fn handle_save(
    args: SaveArgs,
    store: &RecoveryStore,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    let entry = pick(store, args.index, args.variant).await?;
    files::write_export(Path::new(&args.path), &entry.content).await?;
    tracing::info!(path = %args.path, variant = %entry.variant, "recovery entry written");

    if args.take && !store.remove(&entry).await? {
        return Err(PanelError::EntryNotFound {
            variant: entry.variant,
        }
        .into());
    }
    writeln!(out, "Work exported")?;
    Ok(0)
}

pub async fn handle_clear(
    args: ClearArgs,
    store: &RecoveryStore,
    interaction: &dyn Interaction,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    if store.is_empty().await? {
        writeln!(out, "No unsaved work.")?;
        return Ok(0);
    }
    if !args.yes {
        let answer = interaction
            .confirm(
                "Are you sure you want to delete all unsaved snapshots?",
                &[CLEAR_CHOICE],
            )
            .await;
        if answer.as_deref() != Some(CLEAR_CHOICE) {
            writeln!(out, "Nothing removed.")?;
            return Ok(0);
        }
    }
    let removed = store.clear().await?;
    writeln!(out, "Removed {removed} snapshots.")?;
    Ok(0)
}
