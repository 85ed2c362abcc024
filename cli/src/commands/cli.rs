use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "calcpanel", version, about = "Calculator panel host with unsaved-work recovery")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Recovery store file. `:memory:` keeps the log for this process only.
    #[arg(long, global = true)]
    pub store: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// JSON-lines host messages. Reads stdin when omitted.
    #[arg(long)]
    pub script: Option<String>,

    /// Answer for confirmations the script does not answer itself
    /// (e.g. "Reopen" or "Later"). Unanswered prompts count as dismissed.
    #[arg(long)]
    pub answer: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub variant: Option<String>,

    /// Print entries as JSON lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ShowArgs {
    /// Position in `recovery list` output (0 = most recent).
    pub index: usize,

    #[arg(long)]
    pub variant: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SaveArgs {
    pub index: usize,

    /// Destination file for the entry's content.
    pub path: String,

    #[arg(long)]
    pub variant: Option<String>,

    /// Remove the entry from the log once it is written.
    #[arg(long)]
    pub take: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecoveryCommand {
    /// List unsaved snapshots, most recent first
    List(ListArgs),
    /// Print one snapshot's content
    Show(ShowArgs),
    /// Write one snapshot's content to a file
    Save(SaveArgs),
    /// Delete every snapshot
    Clear(ClearArgs),
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive headless calculator panels from host messages
    Run(RunArgs),
    /// Inspect the recovery log
    #[command(subcommand)]
    Recovery(RecoveryCommand),
}
