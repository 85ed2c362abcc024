pub mod cli;
pub mod recovery;
