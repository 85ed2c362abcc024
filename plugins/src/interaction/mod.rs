pub mod scripted;
pub mod terminal;

pub use scripted::ScriptedInteraction;
pub use terminal::TerminalInteraction;
