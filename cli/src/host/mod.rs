//! Scripted host driving headless calculator panels.

pub mod protocol;
pub mod run;

pub use run::{run, Host};
